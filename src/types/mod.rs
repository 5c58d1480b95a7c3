use super::error::{MatchFault, RuleApplicationError, RuleError, UnknownOrder};

pub use self::term::*;
mod term;

pub use self::pattern::*;
mod pattern;

pub use self::rule::*;
mod rule;

pub use self::strategy::*;
mod strategy;
