//! Struct instances.

use std::{
    cell::RefCell,
    collections::HashSet,
    fmt,
    hash::{Hash, Hasher},
    sync::Arc,
};

use indexmap::IndexMap;
use parking_lot::RwLock;

use crate::{
    enumerator::{Enumerator, Pairs, Values},
    exceptions::Condition,
    records::{Accessor, Kind, Schema},
    symbols::Symbol,
    value::Value,
};

struct InstanceInner {
    kind: Kind,
    /// The kind's schema as it was sealed.
    schema: Arc<Schema>,
    slots: RwLock<Vec<Value>>,
}

/// One struct value. Cloning produces another handle to the same instance;
/// use [`Instance::dup`] for a copy.
#[derive(Clone)]
pub struct Instance(Arc<InstanceInner>);

impl Instance {
    pub(crate) fn from_parts(kind: Kind, schema: Arc<Schema>, slots: Vec<Value>) -> Self {
        debug_assert_eq!(schema.len(), slots.len());
        Self(Arc::new(InstanceInner {
            kind,
            schema,
            slots: RwLock::new(slots),
        }))
    }

    pub fn kind(&self) -> &Kind {
        &self.0.kind
    }

    pub fn schema(&self) -> &Schema {
        &self.0.schema
    }

    pub fn members(&self) -> Vec<Symbol> {
        self.schema().members().collect()
    }

    /// Whether both handles refer to the same instance.
    pub fn ptr_eq(&self, rhs: &Self) -> bool {
        Arc::ptr_eq(&self.0, &rhs.0)
    }

    pub(crate) fn slot(&self, slot: usize) -> Value {
        self.0.slots.read()[slot].clone()
    }

    pub(crate) fn set_slot(&self, slot: usize, value: Value) {
        self.0.slots.write()[slot] = value;
    }

    /// `instance[key]`. The key is an offset in `-size..size` or a member
    /// name given as a symbol or string.
    pub fn get(&self, key: &Value) -> Result<Value, Condition> {
        let slot = self.schema().resolve(key)?;
        Ok(self.slot(slot))
    }

    /// `instance[key] = value`
    pub fn set(&self, key: &Value, value: Value) -> Result<(), Condition> {
        let slot = self.schema().resolve(key)?;
        self.set_slot(slot, value);
        Ok(())
    }

    pub fn get_member(&self, member: impl Into<Symbol>) -> Result<Value, Condition> {
        self.get(&Value::Symbol(member.into()))
    }

    pub fn set_member(&self, member: impl Into<Symbol>, value: Value) -> Result<(), Condition> {
        self.set(&Value::Symbol(member.into()), value)
    }

    pub fn len(&self) -> usize {
        self.schema().len()
    }

    pub fn size(&self) -> usize {
        self.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schema().is_empty()
    }

    /// Call `consumer` with every value in member order. The slots are not
    /// locked while the consumer runs, so it may write to the instance.
    pub fn each<F>(&self, mut consumer: F) -> Result<&Self, Condition>
    where
        F: FnMut(Value) -> Result<(), Condition>,
    {
        for slot in 0..self.len() {
            consumer(self.slot(slot))?;
        }
        Ok(self)
    }

    /// Like [`each`](Self::each), with the member name alongside the value.
    pub fn each_pair<F>(&self, mut consumer: F) -> Result<&Self, Condition>
    where
        F: FnMut(Symbol, Value) -> Result<(), Condition>,
    {
        for (slot, member) in self.schema().members().enumerate() {
            consumer(member, self.slot(slot))?;
        }
        Ok(self)
    }

    /// `each` without a consumer: a restartable enumerator over the values.
    pub fn each_enum(&self) -> Values {
        Enumerator::new(self.clone(), |_, value| value)
    }

    /// `each_pair` without a consumer.
    pub fn each_pair_enum(&self) -> Pairs {
        Enumerator::new(self.clone(), |member, value| (member, value))
    }

    pub fn to_a(&self) -> Vec<Value> {
        self.0.slots.read().clone()
    }

    pub fn values(&self) -> Vec<Value> {
        self.to_a()
    }

    pub fn to_h(&self) -> IndexMap<Symbol, Value> {
        let slots = self.0.slots.read();
        self.schema()
            .members()
            .zip(slots.iter().cloned())
            .collect()
    }

    /// Values at the given selectors. A selector is an integer offset or a
    /// range of offsets; ranges are expanded and each offset resolved as in
    /// [`get`](Self::get).
    pub fn values_at(&self, selectors: &[Value]) -> Result<Vec<Value>, Condition> {
        let mut result = Vec::with_capacity(selectors.len());
        for selector in selectors {
            match selector {
                Value::Integer(offset) => result.push(self.get(&Value::Integer(*offset))?),
                Value::Range(range) => {
                    for offset in range.offsets() {
                        result.push(self.get(&Value::Integer(offset))?);
                    }
                }
                selector => {
                    return Err(Condition::no_implicit_conversion(&selector.type_name()));
                }
            }
        }
        Ok(result)
    }

    /// Structural equality: same kind, and pairwise equal values.
    pub fn eql(&self, rhs: &Instance) -> bool {
        if self.ptr_eq(rhs) {
            return true;
        }
        if self.kind() != rhs.kind() || self.len() != rhs.len() {
            return false;
        }
        let key = (Arc::as_ptr(&self.0) as usize, Arc::as_ptr(&rhs.0) as usize);
        // A pair already being compared further up the stack is assumed
        // equal; any difference shows up at the outer comparison.
        if !COMPARING.with(|guard| guard.borrow_mut().insert(key)) {
            return true;
        }
        // Snapshot both sides so nested comparisons never run under a lock.
        let (lhs, rhs) = (self.to_a(), rhs.to_a());
        let equal = lhs.iter().zip(rhs.iter()).all(|(a, b)| a == b);
        COMPARING.with(|guard| guard.borrow_mut().remove(&key));
        equal
    }

    /// A new instance of the same kind holding the same values.
    pub fn dup(&self) -> Instance {
        Self::from_parts(self.kind().clone(), self.0.schema.clone(), self.to_a())
    }

    /// Invoke a method by name: methods attached by the kind's declaration
    /// body first, then the generated `member` and `member=` accessors.
    pub fn call(&self, method: &str, args: &[Value]) -> Result<Value, Condition> {
        if let Some(found) = Symbol::lookup(method).and_then(|sym| self.kind().find_method(sym)) {
            return found(self, args);
        }

        let no_method = || Condition::no_method(method, self.inspect());
        if let Some(member) = method.strip_suffix('=') {
            let accessor = self.accessor_for(member).ok_or_else(no_method)?;
            let [value] = args else {
                return Err(Condition::argument(format!(
                    "wrong number of arguments (given {}, expected 1)",
                    args.len()
                )));
            };
            accessor.set(self, value.clone())?;
            Ok(value.clone())
        } else {
            let accessor = self.accessor_for(method).ok_or_else(no_method)?;
            if !args.is_empty() {
                return Err(Condition::argument(format!(
                    "wrong number of arguments (given {}, expected 0)",
                    args.len()
                )));
            }
            accessor.get(self)
        }
    }

    fn accessor_for(&self, member: &str) -> Option<Accessor> {
        self.kind().accessor(Symbol::lookup(member)?).ok()
    }

    /// `#<struct Name a=1, b=2>`. Anonymous kinds leave the name out.
    pub fn inspect(&self) -> String {
        INSPECTING.with(|guard| {
            let key = Arc::as_ptr(&self.0) as usize;
            let mut result = String::from("#<struct ");
            if let Some(name) = self.kind().name() {
                result.push_str(name);
                result.push(' ');
            }

            if !guard.borrow_mut().insert(key) {
                // Drop the trailing space before marking the recursion.
                result.pop();
                result.push_str(":...>");
                return result;
            }

            let pairs = self
                .schema()
                .members()
                .zip(self.to_a())
                .map(|(member, value)| format!("{member}={}", value.inspect()))
                .collect::<Vec<_>>();
            guard.borrow_mut().remove(&key);

            result.push_str(&pairs.join(", "));
            result.push('>');
            result
        })
    }

    pub fn to_s(&self) -> String {
        self.inspect()
    }
}

thread_local! {
    static INSPECTING: RefCell<HashSet<usize>> = RefCell::new(HashSet::new());
    static COMPARING: RefCell<HashSet<(usize, usize)>> = RefCell::new(HashSet::new());
    static HASHING: RefCell<HashSet<usize>> = RefCell::new(HashSet::new());
}

impl PartialEq for Instance {
    fn eq(&self, rhs: &Self) -> bool {
        self.eql(rhs)
    }
}

impl Eq for Instance {}

/// Consistent with [`Instance::eql`]: equal instances share a kind and their
/// values, and nothing else is hashed. An instance reached again while it is
/// being hashed contributes only its kind.
impl Hash for Instance {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.kind().hash(state);
        let key = Arc::as_ptr(&self.0) as usize;
        if !HASHING.with(|guard| guard.borrow_mut().insert(key)) {
            return;
        }
        self.to_a().hash(state);
        HASHING.with(|guard| guard.borrow_mut().remove(&key));
    }
}

impl fmt::Display for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.inspect())
    }
}

impl fmt::Debug for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.inspect())
    }
}
