use super::object::{JsObjectData, ObjRef, set_prototype_of};
use crate::error::ObjectModelError;
use crate::types::JsObject;
use std::cell::RefCell;
use std::rc::Rc;

/// Id-indexed object arena. Values refer to objects by index, which keeps
/// environment bindings from owning the closures they name.
#[derive(Default)]
pub struct Heap {
    objects: Vec<ObjRef>,
}

impl Heap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn allocate(&mut self, mut data: JsObjectData) -> (JsObject, ObjRef) {
        let id = self.objects.len() as u64;
        data.id = Some(id);
        tracing::trace!(id, class = %data.class_name, "allocate object");
        let obj = Rc::new(RefCell::new(data));
        self.objects.push(obj.clone());
        (JsObject { id }, obj)
    }

    pub fn get(&self, obj: JsObject) -> Option<ObjRef> {
        self.objects.get(obj.id as usize).cloned()
    }

    pub fn resolve(&self, obj: JsObject) -> Result<ObjRef, ObjectModelError> {
        self.get(obj).ok_or(ObjectModelError::DanglingObject(obj.id))
    }

    /// §10.1.12 OrdinaryObjectCreate. The prototype is resolved before
    /// anything is allocated.
    pub fn ordinary_object_create(
        &mut self,
        proto: Option<JsObject>,
    ) -> Result<(JsObject, ObjRef), ObjectModelError> {
        let proto = proto.map(|p| self.resolve(p)).transpose()?;
        let (handle, obj) = self.allocate(JsObjectData::new());
        set_prototype_of(&obj, proto)?;
        Ok((handle, obj))
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}
