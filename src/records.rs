//! Struct kinds and their schemas.
//!
//! A [`Kind`] is a declared record type. Every kind other than the abstract
//! [base](Kind::base) owns a [`Schema`]: the ordered list of its member names.
//! A member's position in the schema is the slot its value occupies in every
//! instance of the kind.
//!
//! Schemas are filled in while a kind is being declared and are sealed as
//! soon as the first instance is constructed. Deriving a kind from another
//! copies the parent's member list as it stands at that moment; the two
//! schemas evolve independently afterwards.

use std::{fmt, hash::Hash, sync::Arc, sync::LazyLock};

use by_address::ByAddress;
use indexmap::{IndexMap, IndexSet};
use parking_lot::RwLock;

use crate::{exceptions::Condition, instance::Instance, symbols::Symbol, value::Value};

/// Ordered, duplicate free list of member names.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Schema {
    members: IndexSet<Symbol>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn members(&self) -> impl ExactSizeIterator<Item = Symbol> + '_ {
        self.members.iter().copied()
    }

    pub fn contains(&self, member: Symbol) -> bool {
        self.members.contains(&member)
    }

    /// Slot of the given member.
    pub fn position(&self, member: Symbol) -> Option<usize> {
        self.members.get_index_of(&member)
    }

    pub fn member(&self, slot: usize) -> Option<Symbol> {
        self.members.get_index(slot).copied()
    }

    /// Translate an offset in `-len..len` into a slot. Negative offsets count
    /// back from the last member.
    pub fn resolve_offset(&self, offset: i64) -> Result<usize, Condition> {
        let len = self.len() as i64;
        if offset < -len || offset >= len {
            return Err(Condition::invalid_offset(offset, self.len()));
        }
        let slot = if offset < 0 { offset + len } else { offset };
        Ok(slot as usize)
    }

    /// Resolve a member name given as a symbol or string.
    pub fn resolve_name(&self, name: &str) -> Result<usize, Condition> {
        Symbol::lookup(name)
            .and_then(|sym| self.position(sym))
            .ok_or_else(|| Condition::no_member(name))
    }

    /// Resolve an index key: an integer offset, or a symbol or string naming
    /// a member.
    pub fn resolve(&self, key: &Value) -> Result<usize, Condition> {
        match key {
            Value::Integer(offset) => self.resolve_offset(*offset),
            Value::Symbol(sym) => self
                .position(*sym)
                .ok_or_else(|| Condition::no_member(sym)),
            Value::String(name) => self.resolve_name(name),
            key => Err(Condition::no_implicit_conversion(&key.type_name())),
        }
    }

    fn push(&mut self, member: Symbol) -> Result<usize, Condition> {
        let (slot, inserted) = self.members.insert_full(member);
        if !inserted {
            return Err(Condition::duplicate_member(member));
        }
        Ok(slot)
    }
}

impl<S> FromIterator<S> for Schema
where
    S: Into<Symbol>,
{
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            members: iter.into_iter().map(Into::into).collect(),
        }
    }
}

/// How construction treats an argument list whose length differs from the
/// member count.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum ArityPolicy {
    /// Missing arguments are `nil`, excess arguments are an error.
    #[default]
    RejectExcess,
    /// The argument count must equal the member count.
    Exact,
    /// Missing arguments are `nil`, excess arguments are dropped.
    Lenient,
}

impl ArityPolicy {
    pub fn check(self, expected: usize, provided: usize) -> Result<(), Condition> {
        let ok = match self {
            Self::RejectExcess => provided <= expected,
            Self::Exact => provided == expected,
            Self::Lenient => true,
        };
        if ok {
            Ok(())
        } else {
            Err(Condition::struct_size_differs(expected, provided))
        }
    }
}

/// Construction options of a kind. Derived kinds inherit them.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct KindOptions {
    pub arity: ArityPolicy,
}

/// A method attached to a kind by its declaration body.
pub type Method = Arc<dyn Fn(&Instance, &[Value]) -> Result<Value, Condition> + Send + Sync>;

#[derive(Debug)]
struct SchemaState {
    schema: Arc<Schema>,
    sealed: bool,
}

struct KindInner {
    name: Option<Arc<str>>,
    parent: Option<Kind>,
    /// `None` only for the abstract base.
    schema: Option<RwLock<SchemaState>>,
    options: KindOptions,
    methods: RwLock<IndexMap<Symbol, Method>>,
}

/// A struct kind. Cloning produces another handle to the same kind; kinds
/// compare and hash by identity.
#[derive(Clone)]
pub struct Kind(ByAddress<Arc<KindInner>>);

static BASE: LazyLock<Kind> = LazyLock::new(|| {
    Kind(ByAddress(Arc::new(KindInner {
        name: Some(Arc::from("Struct")),
        parent: None,
        schema: None,
        options: KindOptions::default(),
        methods: RwLock::new(IndexMap::new()),
    })))
});

impl Kind {
    /// The abstract kind every struct kind derives from. It has no schema.
    pub fn base() -> Kind {
        BASE.clone()
    }

    pub fn is_base(&self) -> bool {
        self.0.schema.is_none()
    }

    pub fn name(&self) -> Option<&str> {
        self.0.name.as_deref()
    }

    pub fn parent(&self) -> Option<&Kind> {
        self.0.parent.as_ref()
    }

    pub fn options(&self) -> KindOptions {
        self.0.options
    }

    /// Whether `self` is `ancestor` or derives from it.
    pub fn is_a(&self, ancestor: &Kind) -> bool {
        let mut curr = Some(self);
        while let Some(kind) = curr {
            if kind == ancestor {
                return true;
            }
            curr = kind.parent();
        }
        false
    }

    /// Derive a new kind from `self`, inheriting its options.
    pub fn derive(&self, name: Option<&str>) -> Kind {
        self.derive_with(name, self.options())
    }

    /// Derive a new kind from `self`. The parent's member list is copied as
    /// it is now; members added to either kind later are not shared.
    pub fn derive_with(&self, name: Option<&str>, options: KindOptions) -> Kind {
        let schema = match &self.0.schema {
            Some(state) => Schema::clone(&state.read().schema),
            None => Schema::new(),
        };
        tracing::debug!(
            parent = %self,
            name = name.unwrap_or("<anonymous>"),
            inherited = schema.len(),
            "derived struct kind"
        );
        Kind(ByAddress(Arc::new(KindInner {
            name: name.map(Arc::from),
            parent: Some(self.clone()),
            schema: Some(RwLock::new(SchemaState {
                schema: Arc::new(schema),
                sealed: false,
            })),
            options,
            methods: RwLock::new(IndexMap::new()),
        })))
    }

    /// Register a new member at the end of the schema, returning its slot.
    pub fn define_member(&self, member: impl Into<Symbol>) -> Result<usize, Condition> {
        let member = member.into();
        let Some(state) = &self.0.schema else {
            return Err(Condition::base_cannot_define_members());
        };
        let mut state = state.write();
        if state.sealed {
            return Err(Condition::sealed(self, member));
        }
        let slot = Arc::make_mut(&mut state.schema).push(member)?;
        tracing::debug!(kind = %self, %member, slot, "defined struct member");
        Ok(slot)
    }

    /// The member names of this kind, in slot order.
    pub fn members(&self) -> Result<Vec<Symbol>, Condition> {
        Ok(self.schema()?.members().collect())
    }

    pub fn schema(&self) -> Result<Arc<Schema>, Condition> {
        match &self.0.schema {
            Some(state) => Ok(state.read().schema.clone()),
            None => Err(Condition::base_has_no_members()),
        }
    }

    pub fn is_sealed(&self) -> bool {
        self.0
            .schema
            .as_ref()
            .is_some_and(|state| state.read().sealed)
    }

    /// Freeze the schema and hand it out for a construction with `provided`
    /// arguments. A construction the arity policy rejects leaves the kind
    /// unsealed.
    pub(crate) fn seal(&self, provided: usize) -> Result<Arc<Schema>, Condition> {
        let Some(state) = &self.0.schema else {
            return Err(Condition::base_cannot_be_instantiated());
        };
        let mut state = state.write();
        self.options().arity.check(state.schema.len(), provided)?;
        if !state.sealed {
            tracing::trace!(kind = %self, members = state.schema.len(), "sealed struct kind");
            state.sealed = true;
        }
        Ok(state.schema.clone())
    }

    /// Attach a method to this kind. Redefining a method replaces it.
    pub fn define_method<F>(&self, name: impl Into<Symbol>, method: F)
    where
        F: Fn(&Instance, &[Value]) -> Result<Value, Condition> + Send + Sync + 'static,
    {
        let name = name.into();
        tracing::debug!(kind = %self, method = %name, "defined struct method");
        self.0.methods.write().insert(name, Arc::new(method));
    }

    /// Look up a method on this kind, then on its ancestors.
    pub fn find_method(&self, name: Symbol) -> Option<Method> {
        let mut curr = Some(self);
        while let Some(kind) = curr {
            if let Some(method) = kind.0.methods.read().get(&name) {
                return Some(method.clone());
            }
            curr = kind.parent();
        }
        None
    }

    /// The generated getter/setter pair of a member.
    pub fn accessor(&self, member: impl Into<Symbol>) -> Result<Accessor, Condition> {
        let member = member.into();
        let slot = self
            .schema()?
            .position(member)
            .ok_or_else(|| Condition::no_member(member))?;
        Ok(Accessor {
            kind: self.clone(),
            member,
            slot,
        })
    }

    /// Construct an instance from positional arguments. Argument `i` is
    /// assigned to member `i`; see [`ArityPolicy`] for mismatched counts.
    pub fn new_instance(&self, args: impl Into<Vec<Value>>) -> Result<Instance, Condition> {
        let mut args = args.into();
        let schema = self.seal(args.len())?;
        args.resize(schema.len(), Value::Nil);
        Ok(Instance::from_parts(self.clone(), schema, args))
    }

    /// The `Kind[...]` shorthand. On the base kind the arguments name the
    /// members of a new anonymous kind; on any other kind they construct an
    /// instance.
    pub fn call(&self, args: &[Value]) -> Result<Value, Condition> {
        if self.is_base() {
            let members = args
                .iter()
                .map(member_name)
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Value::Kind(crate::factory::declare(members)?))
        } else {
            Ok(Value::Struct(self.new_instance(args)?))
        }
    }
}

/// Interpret a value as a member name.
pub(crate) fn member_name(value: &Value) -> Result<Symbol, Condition> {
    match value {
        Value::Symbol(sym) => Ok(*sym),
        Value::String(s) => Ok(Symbol::intern(s)),
        value => Err(Condition::Type {
            provided: value.type_name(),
            expected: "Symbol",
        }),
    }
}

impl PartialEq for Kind {
    fn eq(&self, rhs: &Self) -> bool {
        self.0 == rhs.0
    }
}

impl Eq for Kind {}

impl Hash for Kind {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.0.hash(state)
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => write!(f, "{name}"),
            None => write!(f, "#<Class:{:p}>", Arc::as_ptr(&self.0.0)),
        }
    }
}

impl fmt::Debug for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let members = self.schema().map(|schema| schema.members().collect::<Vec<_>>());
        f.debug_struct("Kind")
            .field("name", &self.name())
            .field("members", &members.ok())
            .finish()
    }
}

/// Getter and setter bound to one member's slot.
#[derive(Clone, Debug)]
pub struct Accessor {
    kind: Kind,
    member: Symbol,
    slot: usize,
}

impl Accessor {
    pub fn member(&self) -> Symbol {
        self.member
    }

    pub fn get(&self, instance: &Instance) -> Result<Value, Condition> {
        let slot = self.slot_in(instance)?;
        Ok(instance.slot(slot))
    }

    pub fn set(&self, instance: &Instance, value: Value) -> Result<(), Condition> {
        let slot = self.slot_in(instance)?;
        instance.set_slot(slot, value);
        Ok(())
    }

    /// A derived kind keeps its parent's slots for inherited members, unless
    /// the member was added to the parent after the derivation. Fall back to
    /// a name lookup so the accessor always agrees with `instance[member]`.
    fn slot_in(&self, instance: &Instance) -> Result<usize, Condition> {
        let kind = instance.kind();
        if !kind.is_a(&self.kind) {
            return Err(Condition::no_method(self.member, instance.inspect()));
        }
        let schema = instance.schema();
        if schema.member(self.slot) == Some(self.member) {
            Ok(self.slot)
        } else {
            schema
                .position(self.member)
                .ok_or_else(|| Condition::no_member(self.member))
        }
    }
}
