use super::environment::{EnvRef, Environment};
use super::heap::Heap;
use super::object::{JsObjectData, PropertyDescriptor, set_prototype_of};
use crate::ast::Species;
use crate::error::Result;
use crate::keys;
use crate::types::{JsObject, JsValue};
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_REALM_ID: AtomicU64 = AtomicU64::new(1);

/// The prototype objects closure instantiation consumes.
#[derive(Debug, Clone, Copy)]
pub struct Intrinsics {
    pub object_prototype: JsObject,
    pub function_prototype: JsObject,
    pub async_function_prototype: JsObject,
    pub generator_function_prototype: JsObject,
    pub generator_prototype: JsObject,
    pub async_generator_function_prototype: JsObject,
    pub async_generator_prototype: JsObject,
}

impl Intrinsics {
    /// `[[Prototype]]` of a freshly created function of this species.
    pub fn function_prototype_for(&self, species: Species) -> JsObject {
        match species {
            Species::Ordinary => self.function_prototype,
            Species::Async => self.async_function_prototype,
            Species::Generator => self.generator_function_prototype,
            Species::AsyncGenerator => self.async_generator_function_prototype,
        }
    }
}

#[derive(Debug)]
pub struct Realm {
    id: u64,
    intrinsics: Intrinsics,
    global_env: EnvRef,
}

impl Realm {
    /// Allocates the minimal intrinsic set and a global environment holding
    /// `undefined`.
    pub fn create(heap: &mut Heap) -> Result<Rc<Realm>> {
        let (object_prototype, _) = heap.allocate(JsObjectData::new());

        let function_prototype = Self::create_prototype(heap, object_prototype, "Function")?;
        let async_function_prototype =
            Self::create_prototype(heap, function_prototype, "AsyncFunction")?;

        let generator_prototype = Self::create_prototype(heap, object_prototype, "Generator")?;
        let generator_function_prototype =
            Self::create_prototype(heap, function_prototype, "GeneratorFunction")?;
        Self::link_instance_prototype(heap, generator_function_prototype, generator_prototype)?;

        let async_generator_prototype =
            Self::create_prototype(heap, object_prototype, "AsyncGenerator")?;
        let async_generator_function_prototype =
            Self::create_prototype(heap, function_prototype, "AsyncGeneratorFunction")?;
        Self::link_instance_prototype(
            heap,
            async_generator_function_prototype,
            async_generator_prototype,
        )?;

        let global_env = Environment::new_declarative(None);
        {
            let mut env = global_env.borrow_mut();
            env.create_immutable_binding(keys::UNDEFINED.as_str(), false)?;
            env.initialize_binding(keys::UNDEFINED.as_str(), JsValue::Undefined)?;
        }

        let id = NEXT_REALM_ID.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(realm = id, "realm created");
        Ok(Rc::new(Realm {
            id,
            intrinsics: Intrinsics {
                object_prototype,
                function_prototype,
                async_function_prototype,
                generator_function_prototype,
                generator_prototype,
                async_generator_function_prototype,
                async_generator_prototype,
            },
            global_env,
        }))
    }

    fn create_prototype(heap: &mut Heap, parent: JsObject, class_name: &str) -> Result<JsObject> {
        let (handle, obj) = heap.ordinary_object_create(Some(parent))?;
        obj.borrow_mut().class_name = class_name.to_string();
        Ok(handle)
    }

    // %XFunction.prototype%.prototype is { [[Writable]]: false, [[Enumerable]]: false, [[Configurable]]: true }
    fn link_instance_prototype(heap: &mut Heap, function_proto: JsObject, instance_proto: JsObject) -> Result<()> {
        let function_obj = heap.resolve(function_proto)?;
        let instance_obj = heap.resolve(instance_proto)?;
        function_obj.borrow_mut().define_property_or_throw(
            keys::PROTOTYPE.as_str(),
            PropertyDescriptor::data(JsValue::Object(instance_proto), false, false, true),
        )?;
        instance_obj.borrow_mut().define_property_or_throw(
            keys::CONSTRUCTOR.as_str(),
            PropertyDescriptor::data(JsValue::Object(function_proto), false, false, true),
        )?;
        Ok(())
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn intrinsics(&self) -> &Intrinsics {
        &self.intrinsics
    }

    pub fn global_env(&self) -> &EnvRef {
        &self.global_env
    }
}

/// Replaces the `[[Prototype]]` of an intrinsic, e.g. when a host wires its
/// own `%IteratorPrototype%` under the generator prototypes.
pub fn reparent_intrinsic(heap: &Heap, intrinsic: JsObject, parent: Option<JsObject>) -> Result<()> {
    let obj = heap.resolve(intrinsic)?;
    let parent = parent.map(|p| heap.resolve(p)).transpose()?;
    set_prototype_of(&obj, parent)?;
    Ok(())
}
