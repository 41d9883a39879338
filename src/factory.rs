//! Declaring struct kinds.
//!
//! ```
//! use struct_rs::{factory::{declare_named, Binding}, namespace::Namespace, value::Value};
//!
//! let ns = Namespace::default();
//! let point = declare_named(&ns, "Point", ["x", "y"], Binding::Register).unwrap();
//! let p = point.new_instance(vec![Value::from(1), Value::from(2)]).unwrap();
//! assert_eq!(p.inspect(), "#<struct Struct::Point x=1, y=2>");
//! assert_eq!(ns.get("Point"), Some(point));
//! ```

use crate::{
    exceptions::Condition,
    instance::Instance,
    namespace::Namespace,
    records::{Kind, KindOptions},
    symbols::Symbol,
    value::Value,
};

/// What [`declare_named`] does with the name it is given.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Binding {
    /// Name the new kind and register it in the namespace.
    Register,
    /// Treat the name as the first member of an anonymous kind.
    Anonymous,
}

impl Binding {
    /// `Register` for names that look like constants (`Point`), `Anonymous`
    /// for anything else (`point`).
    pub fn infer(name: &str) -> Self {
        if name.chars().next().is_some_and(char::is_uppercase) {
            Self::Register
        } else {
            Self::Anonymous
        }
    }
}

/// The context a declaration body runs in.
pub struct Declaration<'k> {
    kind: &'k Kind,
}

impl Declaration<'_> {
    pub fn kind(&self) -> &Kind {
        self.kind
    }

    /// Append a member to the kind being declared.
    pub fn member(&mut self, name: impl Into<Symbol>) -> Result<&mut Self, Condition> {
        self.kind.define_member(name)?;
        Ok(self)
    }

    pub fn method<F>(&mut self, name: impl Into<Symbol>, method: F) -> &mut Self
    where
        F: Fn(&Instance, &[Value]) -> Result<Value, Condition> + Send + Sync + 'static,
    {
        self.kind.define_method(name, method);
        self
    }
}

/// Declare an anonymous kind with the given members, in order.
pub fn declare<I, S>(members: I) -> Result<Kind, Condition>
where
    I: IntoIterator<Item = S>,
    S: Into<Symbol>,
{
    declare_with(members, KindOptions::default(), |_| Ok(()))
}

/// Declare an anonymous kind, running `body` against it before it is
/// returned.
pub fn declare_with<I, S, B>(members: I, options: KindOptions, body: B) -> Result<Kind, Condition>
where
    I: IntoIterator<Item = S>,
    S: Into<Symbol>,
    B: FnOnce(&mut Declaration<'_>) -> Result<(), Condition>,
{
    build(Kind::base().derive_with(None, options), members, body)
}

/// Declare a kind under `name`. See [`Binding`] for how the name is used.
pub fn declare_named<I, S>(
    namespace: &Namespace,
    name: &str,
    members: I,
    binding: Binding,
) -> Result<Kind, Condition>
where
    I: IntoIterator<Item = S>,
    S: Into<Symbol>,
{
    declare_named_with(
        namespace,
        name,
        members,
        binding,
        KindOptions::default(),
        |_| Ok(()),
    )
}

/// [`declare_named`] with options and a declaration body. A registered kind
/// is only bound once the body has run successfully.
pub fn declare_named_with<I, S, B>(
    namespace: &Namespace,
    name: &str,
    members: I,
    binding: Binding,
    options: KindOptions,
    body: B,
) -> Result<Kind, Condition>
where
    I: IntoIterator<Item = S>,
    S: Into<Symbol>,
    B: FnOnce(&mut Declaration<'_>) -> Result<(), Condition>,
{
    match binding {
        Binding::Register => {
            let constant = Symbol::intern(name);
            if !constant.is_constant_like() {
                return Err(Condition::argument(format!(
                    "identifier {name} needs to be constant"
                )));
            }
            let qualified = namespace.qualify(constant);
            let kind = build(
                Kind::base().derive_with(Some(qualified.as_str()), options),
                members,
                body,
            )?;
            namespace.bind(constant, kind.clone());
            Ok(kind)
        }
        Binding::Anonymous => {
            let members = std::iter::once(Symbol::intern(name))
                .chain(members.into_iter().map(Into::into));
            declare_with(members, options, body)
        }
    }
}

fn build<I, S, B>(kind: Kind, members: I, body: B) -> Result<Kind, Condition>
where
    I: IntoIterator<Item = S>,
    S: Into<Symbol>,
    B: FnOnce(&mut Declaration<'_>) -> Result<(), Condition>,
{
    for member in members {
        kind.define_member(member)?;
    }
    body(&mut Declaration { kind: &kind })?;
    tracing::debug!(kind = %kind, members = ?kind.members()?, "declared struct kind");
    Ok(kind)
}
