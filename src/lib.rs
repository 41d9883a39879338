//! Ordered, named-field record kinds for embedded dynamic-language runtimes.
//!
//! A struct kind is declared once with a list of member names and then
//! instantiated any number of times:
//!
//! ```
//! use struct_rs::{factory::declare, value::Value};
//!
//! let kind = declare(["a", "b"]).unwrap();
//! let s = kind.new_instance(vec![Value::from(1), Value::from(2)]).unwrap();
//! assert_eq!(s.get(&Value::from(-1)).unwrap(), Value::from(2));
//! assert_eq!(s.to_s(), "#<struct a=1, b=2>");
//! ```

pub mod enumerator;
pub mod exceptions;
pub mod factory;
pub mod instance;
pub mod namespace;
pub mod records;
pub mod symbols;
pub mod value;

pub use exceptions::Condition;
pub use instance::Instance;
pub use records::Kind;
