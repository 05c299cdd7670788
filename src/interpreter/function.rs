use super::environment::{EnvRef, PrivateEnvRef, PrivateName};
use super::heap::Heap;
use super::object::{JsObjectData, ObjRef, PropertyDescriptor, set_prototype_of};
use super::realm::Realm;
use crate::ast::{FunctionDefinition, Species};
use crate::error::Result;
use crate::keys;
use crate::types::{JsObject, JsString, JsSymbol, JsValue};
use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ThisMode {
    Strict,
    Global,
}

/// Internal slots of an ECMAScript function object (§10.2, Table 30).
pub struct FunctionSlots {
    pub definition: Rc<FunctionDefinition>,
    pub environment: EnvRef,
    pub private_environment: Option<PrivateEnvRef>,
    pub this_mode: ThisMode,
    pub species: Species,
    pub strict: bool,
    pub realm: Rc<Realm>,
    is_constructor: Cell<bool>,
    home_object: Cell<Option<JsObject>>,
}

impl fmt::Debug for FunctionSlots {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FunctionSlots")
            .field("name", &self.definition.name)
            .field("species", &self.species)
            .field("this_mode", &self.this_mode)
            .field("strict", &self.strict)
            .field("is_constructor", &self.is_constructor.get())
            .field("realm", &self.realm.id())
            .finish()
    }
}

/// Value handed to SetFunctionName.
#[derive(Clone, Debug)]
pub enum FunctionName {
    String(JsString),
    Symbol(JsSymbol),
    Private(PrivateName),
}

impl From<&str> for FunctionName {
    fn from(name: &str) -> Self {
        FunctionName::String(JsString::from_str(name))
    }
}

/// Handle to a function object produced by [`ordinary_function_create`].
#[derive(Clone)]
pub struct Closure {
    object: JsObject,
    data: ObjRef,
    slots: Rc<FunctionSlots>,
}

/// §10.2.3 OrdinaryFunctionCreate
///
/// The prototype is resolved before the function object is allocated, so a
/// bad prototype leaves the heap untouched. `name` is left for the caller;
/// `length` is defined here from the definition's ExpectedArgumentCount.
pub fn ordinary_function_create(
    heap: &mut Heap,
    function_prototype: JsObject,
    definition: &Rc<FunctionDefinition>,
    this_mode: ThisMode,
    env: EnvRef,
    private_env: Option<PrivateEnvRef>,
    realm: &Rc<Realm>,
) -> Result<Closure> {
    let proto = heap.resolve(function_prototype)?;
    let slots = Rc::new(FunctionSlots {
        definition: definition.clone(),
        environment: env,
        private_environment: private_env,
        this_mode,
        species: definition.species,
        strict: definition.strict,
        realm: realm.clone(),
        is_constructor: Cell::new(false),
        home_object: Cell::new(None),
    });

    let mut data = JsObjectData::new();
    data.class_name = definition.species.class_name().to_string();
    data.callable = Some(slots.clone());
    let (object, obj) = heap.allocate(data);
    set_prototype_of(&obj, Some(proto))?;

    let closure = Closure {
        object,
        data: obj,
        slots,
    };
    closure.set_function_length(definition.expected_argument_count())?;
    Ok(closure)
}

impl Closure {
    /// Recovers the handle for a function object stored in `heap`.
    pub fn from_value(heap: &Heap, value: &JsValue) -> Option<Closure> {
        let object = value.as_object()?;
        let data = heap.get(object)?;
        let slots = data.borrow().callable.clone()?;
        Some(Closure {
            object,
            data,
            slots,
        })
    }

    pub fn object(&self) -> JsObject {
        self.object
    }

    pub fn value(&self) -> JsValue {
        JsValue::Object(self.object)
    }

    pub fn data(&self) -> &ObjRef {
        &self.data
    }

    pub fn definition(&self) -> &Rc<FunctionDefinition> {
        &self.slots.definition
    }

    pub fn species(&self) -> Species {
        self.slots.species
    }

    pub fn this_mode(&self) -> ThisMode {
        self.slots.this_mode
    }

    pub fn is_strict(&self) -> bool {
        self.slots.strict
    }

    pub fn is_constructor(&self) -> bool {
        self.slots.is_constructor.get()
    }

    pub fn environment(&self) -> &EnvRef {
        &self.slots.environment
    }

    pub fn private_environment(&self) -> Option<&PrivateEnvRef> {
        self.slots.private_environment.as_ref()
    }

    pub fn home_object(&self) -> Option<JsObject> {
        self.slots.home_object.get()
    }

    pub fn realm(&self) -> &Rc<Realm> {
        &self.slots.realm
    }

    pub fn name(&self) -> JsString {
        match self.data.borrow().get_property_value(keys::NAME.as_str()) {
            Some(JsValue::String(s)) => s,
            _ => JsString::default(),
        }
    }

    pub fn length(&self) -> f64 {
        self.data
            .borrow()
            .get_property_value(keys::LENGTH.as_str())
            .and_then(|v| v.as_number())
            .unwrap_or(0.0)
    }

    /// Value of the own `prototype` property, when it holds an object.
    pub fn prototype_property(&self) -> Option<JsObject> {
        self.data
            .borrow()
            .get_property_value(keys::PROTOTYPE.as_str())
            .and_then(|v| v.as_object())
    }

    pub fn get_prototype_of(&self) -> Option<JsObject> {
        let data = self.data.borrow();
        data.prototype.as_ref().and_then(|p| p.borrow().object())
    }

    pub fn own_property(&self, key: &str) -> Option<PropertyDescriptor> {
        self.data.borrow().get_own_property(key).cloned()
    }

    pub fn define_property_or_throw(&self, key: &keys::Key, desc: PropertyDescriptor) -> Result<()> {
        self.data
            .borrow_mut()
            .define_property_or_throw(key.as_str(), desc)?;
        Ok(())
    }

    /// §10.2.10 SetFunctionLength
    pub fn set_function_length(&self, length: usize) -> Result<()> {
        self.define_property_or_throw(
            &keys::LENGTH,
            PropertyDescriptor::data(JsValue::Number(length as f64), false, false, true),
        )
    }

    /// §10.2.9 SetFunctionName
    pub fn set_function_name(&self, name: FunctionName, prefix: Option<&str>) -> Result<()> {
        let mut name = match name {
            FunctionName::String(s) => s,
            FunctionName::Symbol(sym) => match sym.description {
                Some(desc) => JsString::from_str("[")
                    .concat(&desc)
                    .concat(&JsString::from_str("]")),
                None => JsString::default(),
            },
            FunctionName::Private(private) => JsString::from_str(&format!("#{}", private.description)),
        };
        if let Some(prefix) = prefix {
            name = JsString::from_str(&format!("{prefix} ")).concat(&name);
        }
        self.define_property_or_throw(
            &keys::NAME,
            PropertyDescriptor::data(JsValue::String(name), false, false, true),
        )
    }

    /// §10.2.5 MakeConstructor
    ///
    /// Gives the function a fresh `prototype` object whose `constructor`
    /// points back at it.
    pub fn make_constructor(&self, heap: &mut Heap, object_prototype: JsObject) -> Result<()> {
        self.slots.is_constructor.set(true);
        let (prototype, proto_obj) = heap.ordinary_object_create(Some(object_prototype))?;
        proto_obj.borrow_mut().define_property_or_throw(
            keys::CONSTRUCTOR.as_str(),
            PropertyDescriptor::data(self.value(), true, false, true),
        )?;
        self.define_property_or_throw(
            &keys::PROTOTYPE,
            PropertyDescriptor::data(JsValue::Object(prototype), true, false, false),
        )
    }

    /// §10.2.7 MakeMethod
    pub fn make_method(&self, home_object: JsObject) {
        self.slots.home_object.set(Some(home_object));
    }
}

impl fmt::Debug for Closure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Closure")
            .field("object", &self.object.id)
            .field("name", &self.name().to_rust_string())
            .field("slots", &self.slots)
            .finish()
    }
}
