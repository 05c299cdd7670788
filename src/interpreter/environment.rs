use super::object::FxIndexMap;
use crate::error::{Error, Result};
use crate::types::JsValue;
use std::cell::RefCell;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

pub type EnvRef = Rc<RefCell<Environment>>;

/// §9.1.1.1 Declarative Environment Record
#[derive(Debug)]
pub struct Environment {
    pub(crate) bindings: FxIndexMap<String, Binding>,
    pub(crate) parent: Option<EnvRef>,
}

#[derive(Debug, Clone)]
pub(crate) struct Binding {
    pub(crate) value: JsValue,
    pub(crate) mutable: bool,
    pub(crate) initialized: bool,
    pub(crate) strict: bool,
    pub(crate) deletable: bool,
}

impl Environment {
    /// §9.1.2.2 NewDeclarativeEnvironment
    pub fn new_declarative(parent: Option<EnvRef>) -> EnvRef {
        tracing::trace!(has_outer = parent.is_some(), "new declarative environment");
        Rc::new(RefCell::new(Environment {
            bindings: FxIndexMap::default(),
            parent,
        }))
    }

    pub fn outer(&self) -> Option<EnvRef> {
        self.parent.clone()
    }

    /// §9.1.1.1.1 HasBinding
    pub fn has_binding(&self, name: &str) -> bool {
        self.bindings.contains_key(name)
    }

    pub fn is_initialized(&self, name: &str) -> bool {
        self.bindings.get(name).is_some_and(|b| b.initialized)
    }

    pub fn binding_names(&self) -> impl Iterator<Item = &str> {
        self.bindings.keys().map(String::as_str)
    }

    fn create_binding(&mut self, name: &str, binding: Binding) -> Result<()> {
        if self.bindings.contains_key(name) {
            return Err(Error::DuplicateBinding(name.to_string()));
        }
        tracing::trace!(binding = name, mutable = binding.mutable, "create binding");
        self.bindings.insert(name.to_string(), binding);
        Ok(())
    }

    /// §9.1.1.1.2 CreateMutableBinding
    pub fn create_mutable_binding(&mut self, name: &str, deletable: bool) -> Result<()> {
        self.create_binding(
            name,
            Binding {
                value: JsValue::Undefined,
                mutable: true,
                initialized: false,
                strict: false,
                deletable,
            },
        )
    }

    /// §9.1.1.1.3 CreateImmutableBinding
    pub fn create_immutable_binding(&mut self, name: &str, strict: bool) -> Result<()> {
        self.create_binding(
            name,
            Binding {
                value: JsValue::Undefined,
                mutable: false,
                initialized: false,
                strict,
                deletable: false,
            },
        )
    }

    /// §9.1.1.1.4 InitializeBinding
    pub fn initialize_binding(&mut self, name: &str, value: JsValue) -> Result<()> {
        match self.bindings.get_mut(name) {
            Some(binding) if !binding.initialized => {
                binding.value = value;
                binding.initialized = true;
                Ok(())
            }
            _ => Err(Error::UninitializedBinding(name.to_string())),
        }
    }

    /// §9.1.1.1.5 SetMutableBinding
    pub fn set_mutable_binding(&mut self, name: &str, value: JsValue, strict: bool) -> Result<()> {
        let Some(binding) = self.bindings.get_mut(name) else {
            if strict {
                return Err(Error::UnresolvableReference(name.to_string()));
            }
            self.create_mutable_binding(name, true)?;
            return self.initialize_binding(name, value);
        };
        let strict = strict || binding.strict;
        if !binding.initialized {
            return Err(Error::UninitializedBinding(name.to_string()));
        }
        if binding.mutable {
            binding.value = value;
        } else if strict {
            return Err(Error::ImmutableBinding(name.to_string()));
        }
        Ok(())
    }

    /// §9.1.1.1.6 GetBindingValue
    pub fn get_binding_value(&self, name: &str, _strict: bool) -> Result<JsValue> {
        match self.bindings.get(name) {
            Some(binding) if binding.initialized => Ok(binding.value.clone()),
            Some(_) => Err(Error::UninitializedBinding(name.to_string())),
            None => Err(Error::UnresolvableReference(name.to_string())),
        }
    }

    /// §9.1.1.1.7 DeleteBinding
    pub fn delete_binding(&mut self, name: &str) -> bool {
        match self.bindings.get(name) {
            Some(binding) if !binding.deletable => false,
            Some(_) => {
                self.bindings.shift_remove(name);
                true
            }
            None => true,
        }
    }
}

/// §9.1.2.1 GetIdentifierReference: the innermost environment holding `name`.
pub fn get_identifier_reference(env: &EnvRef, name: &str) -> Option<EnvRef> {
    let mut current = Some(env.clone());
    while let Some(e) = current {
        if e.borrow().has_binding(name) {
            return Some(e);
        }
        current = e.borrow().parent.clone();
    }
    None
}

/// Resolves `name` along the chain starting at `env` and reads its value.
pub fn resolve_binding(env: &EnvRef, name: &str, strict: bool) -> Result<JsValue> {
    match get_identifier_reference(env, name) {
        Some(found) => found.borrow().get_binding_value(name, strict),
        None => Err(Error::UnresolvableReference(name.to_string())),
    }
}

pub type PrivateEnvRef = Rc<RefCell<PrivateEnvironment>>;

static NEXT_PRIVATE_NAME_ID: AtomicU64 = AtomicU64::new(1);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrivateName {
    pub id: u64,
    pub description: String,
}

/// §9.2 PrivateEnvironment Record
#[derive(Debug)]
pub struct PrivateEnvironment {
    outer: Option<PrivateEnvRef>,
    names: Vec<PrivateName>,
}

impl PrivateEnvironment {
    /// §9.2.1.1 NewPrivateEnvironment
    pub fn new(outer: Option<PrivateEnvRef>) -> PrivateEnvRef {
        Rc::new(RefCell::new(PrivateEnvironment {
            outer,
            names: Vec::new(),
        }))
    }

    pub fn outer(&self) -> Option<PrivateEnvRef> {
        self.outer.clone()
    }

    /// Adds a private name unless one with the same description already
    /// exists here. Names from distinct class bodies never share an id.
    pub fn add_name(&mut self, description: &str) -> PrivateName {
        if let Some(existing) = self.names.iter().find(|n| n.description == description) {
            return existing.clone();
        }
        let name = PrivateName {
            id: NEXT_PRIVATE_NAME_ID.fetch_add(1, Ordering::Relaxed),
            description: description.to_string(),
        };
        self.names.push(name.clone());
        name
    }

    pub fn names(&self) -> &[PrivateName] {
        &self.names
    }
}

/// §9.2.1.2 ResolvePrivateIdentifier
pub fn resolve_private_identifier(env: &PrivateEnvRef, description: &str) -> Option<PrivateName> {
    let mut current = Some(env.clone());
    while let Some(e) = current {
        if let Some(name) = e.borrow().names.iter().find(|n| n.description == description) {
            return Some(name.clone());
        }
        current = e.borrow().outer.clone();
    }
    None
}
