use super::function::FunctionSlots;
use crate::error::ObjectModelError;
use crate::types::{JsObject, JsValue};
use indexmap::IndexMap;
use rustc_hash::FxBuildHasher;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

pub type ObjRef = Rc<RefCell<JsObjectData>>;

pub type FxIndexMap<K, V> = IndexMap<K, V, FxBuildHasher>;

#[derive(Debug, Clone, Default)]
pub struct PropertyDescriptor {
    pub value: Option<JsValue>,
    pub writable: Option<bool>,
    pub enumerable: Option<bool>,
    pub configurable: Option<bool>,
}

impl PropertyDescriptor {
    pub fn data(value: JsValue, writable: bool, enumerable: bool, configurable: bool) -> Self {
        Self {
            value: Some(value),
            writable: Some(writable),
            enumerable: Some(enumerable),
            configurable: Some(configurable),
        }
    }

    pub fn data_default(value: JsValue) -> Self {
        Self::data(value, true, true, true)
    }

    pub fn is_data_descriptor(&self) -> bool {
        self.value.is_some() || self.writable.is_some()
    }

    // Absent fields of a new property default to false / undefined.
    fn completed(self) -> Self {
        Self {
            value: Some(self.value.unwrap_or(JsValue::Undefined)),
            writable: Some(self.writable.unwrap_or(false)),
            enumerable: Some(self.enumerable.unwrap_or(false)),
            configurable: Some(self.configurable.unwrap_or(false)),
        }
    }

    fn merged_onto(self, current: &PropertyDescriptor) -> Self {
        Self {
            value: self.value.or_else(|| current.value.clone()),
            writable: self.writable.or(current.writable),
            enumerable: self.enumerable.or(current.enumerable),
            configurable: self.configurable.or(current.configurable),
        }
    }
}

pub struct JsObjectData {
    pub(crate) id: Option<u64>,
    pub properties: FxIndexMap<String, PropertyDescriptor>,
    pub prototype: Option<ObjRef>,
    pub callable: Option<Rc<FunctionSlots>>,
    pub class_name: String,
    pub extensible: bool,
}

impl Default for JsObjectData {
    fn default() -> Self {
        Self::new()
    }
}

impl JsObjectData {
    pub fn new() -> Self {
        Self {
            id: None,
            properties: FxIndexMap::default(),
            prototype: None,
            callable: None,
            class_name: "Object".to_string(),
            extensible: true,
        }
    }

    /// Heap handle, once the object has been allocated.
    pub fn object(&self) -> Option<JsObject> {
        self.id.map(|id| JsObject { id })
    }

    pub fn get_property(&self, key: &str) -> JsValue {
        if let Some(desc) = self.properties.get(key) {
            return desc.value.clone().unwrap_or(JsValue::Undefined);
        }
        if let Some(proto) = &self.prototype {
            return proto.borrow().get_property(key);
        }
        JsValue::Undefined
    }

    pub fn get_own_property(&self, key: &str) -> Option<&PropertyDescriptor> {
        self.properties.get(key)
    }

    pub fn has_own_property(&self, key: &str) -> bool {
        self.properties.contains_key(key)
    }

    pub fn has_property(&self, key: &str) -> bool {
        if self.properties.contains_key(key) {
            return true;
        }
        if let Some(proto) = &self.prototype {
            return proto.borrow().has_property(key);
        }
        false
    }

    pub fn get_property_value(&self, key: &str) -> Option<JsValue> {
        self.properties.get(key).and_then(|d| d.value.clone())
    }

    pub fn own_keys(&self) -> impl Iterator<Item = &str> {
        self.properties.keys().map(String::as_str)
    }

    // §10.1.6.3 ValidateAndApplyPropertyDescriptor, data properties only
    fn validate_define(&self, key: &str, desc: &PropertyDescriptor) -> Result<(), ObjectModelError> {
        let Some(current) = self.properties.get(key) else {
            if !self.extensible {
                return Err(ObjectModelError::NotExtensible(key.to_string()));
            }
            return Ok(());
        };
        if current.configurable != Some(false) {
            return Ok(());
        }
        let rejected = desc.configurable == Some(true)
            || (desc.enumerable.is_some() && desc.enumerable != current.enumerable)
            || (current.writable == Some(false)
                && (desc.writable == Some(true)
                    || desc.value.as_ref().is_some_and(|v| {
                        !crate::types::same_value(v, current.value.as_ref().unwrap_or(&JsValue::Undefined))
                    })));
        if rejected {
            return Err(ObjectModelError::NonConfigurable(key.to_string()));
        }
        Ok(())
    }

    pub fn define_own_property(&mut self, key: String, desc: PropertyDescriptor) -> bool {
        self.define_property_or_throw(key, desc).is_ok()
    }

    /// §7.3.8 DefinePropertyOrThrow
    pub fn define_property_or_throw(
        &mut self,
        key: impl Into<String>,
        desc: PropertyDescriptor,
    ) -> Result<(), ObjectModelError> {
        let key = key.into();
        self.validate_define(&key, &desc)?;
        let desc = match self.properties.get(&key) {
            Some(current) => desc.merged_onto(current),
            None => desc.completed(),
        };
        self.properties.insert(key, desc);
        Ok(())
    }
}

impl fmt::Debug for JsObjectData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JsObjectData")
            .field("id", &self.id)
            .field("class_name", &self.class_name)
            .field("keys", &self.properties.keys().collect::<Vec<_>>())
            .field(
                "prototype",
                &self.prototype.as_ref().and_then(|p| p.borrow().id),
            )
            .field("callable", &self.callable)
            .finish()
    }
}

/// §10.1.2.1 OrdinarySetPrototypeOf, throwing on failure.
pub fn set_prototype_of(obj: &ObjRef, proto: Option<ObjRef>) -> Result<(), ObjectModelError> {
    {
        let current = obj.borrow();
        let unchanged = match (&current.prototype, &proto) {
            (Some(a), Some(b)) => Rc::ptr_eq(a, b),
            (None, None) => true,
            _ => false,
        };
        if unchanged {
            return Ok(());
        }
        if !current.extensible {
            return Err(ObjectModelError::NotExtensible("[[Prototype]]".to_string()));
        }
    }
    let mut p = proto.clone();
    while let Some(candidate) = p {
        if Rc::ptr_eq(&candidate, obj) {
            return Err(ObjectModelError::CyclicPrototype);
        }
        p = candidate.borrow().prototype.clone();
    }
    obj.borrow_mut().prototype = proto;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn obj() -> ObjRef {
        Rc::new(RefCell::new(JsObjectData::new()))
    }

    #[test]
    fn define_fills_absent_fields_with_false() {
        let o = obj();
        o.borrow_mut()
            .define_property_or_throw(
                "x",
                PropertyDescriptor {
                    value: Some(JsValue::Number(1.0)),
                    ..Default::default()
                },
            )
            .unwrap();
        let o = o.borrow();
        let desc = o.get_own_property("x").unwrap();
        assert_eq!(desc.writable, Some(false));
        assert_eq!(desc.enumerable, Some(false));
        assert_eq!(desc.configurable, Some(false));
    }

    #[test]
    fn non_configurable_property_rejects_redefinition() {
        let o = obj();
        let mut data = o.borrow_mut();
        data.define_property_or_throw(
            "prototype",
            PropertyDescriptor::data(JsValue::Null, true, false, false),
        )
        .unwrap();
        let err = data
            .define_property_or_throw(
                "prototype",
                PropertyDescriptor::data(JsValue::Null, true, true, false),
            )
            .unwrap_err();
        assert_eq!(err, ObjectModelError::NonConfigurable("prototype".into()));
        // writable value may still change
        assert!(data.define_own_property(
            "prototype".into(),
            PropertyDescriptor {
                value: Some(JsValue::Number(3.0)),
                ..Default::default()
            }
        ));
        assert_eq!(data.get_property_value("prototype").unwrap().as_number(), Some(3.0));
    }

    #[test]
    fn non_writable_non_configurable_value_is_frozen() {
        let o = obj();
        let mut data = o.borrow_mut();
        data.define_property_or_throw("k", PropertyDescriptor::data(JsValue::Number(1.0), false, false, false))
            .unwrap();
        assert!(!data.define_own_property(
            "k".into(),
            PropertyDescriptor::data(JsValue::Number(2.0), false, false, false)
        ));
        assert!(data.define_own_property(
            "k".into(),
            PropertyDescriptor::data(JsValue::Number(1.0), false, false, false)
        ));
    }

    #[test]
    fn non_extensible_rejects_new_properties() {
        let o = obj();
        o.borrow_mut().extensible = false;
        let err = o
            .borrow_mut()
            .define_property_or_throw("name", PropertyDescriptor::data_default(JsValue::Null))
            .unwrap_err();
        assert_eq!(err, ObjectModelError::NotExtensible("name".into()));
    }

    #[test]
    fn prototype_chain_lookup() {
        let base = obj();
        base.borrow_mut()
            .define_property_or_throw("next", PropertyDescriptor::data_default(JsValue::Boolean(true)))
            .unwrap();
        let child = obj();
        set_prototype_of(&child, Some(base.clone())).unwrap();
        assert!(child.borrow().has_property("next"));
        assert!(!child.borrow().has_own_property("next"));
        assert!(matches!(child.borrow().get_property("next"), JsValue::Boolean(true)));
    }

    #[test]
    fn set_prototype_of_detects_cycles() {
        let a = obj();
        let b = obj();
        set_prototype_of(&b, Some(a.clone())).unwrap();
        assert_eq!(
            set_prototype_of(&a, Some(b.clone())),
            Err(ObjectModelError::CyclicPrototype)
        );
        assert_eq!(set_prototype_of(&a, Some(a.clone())), Err(ObjectModelError::CyclicPrototype));
    }
}
