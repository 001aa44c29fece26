//!
//! # Dependency-Ordering Trait and Helpers
//!

// Std-Lib
use std::collections::HashSet;

///
/// # Dependency-Ordering Trait
///
/// Hierarchical netlists form a graph: components instance other components.
/// Components are commonly stored in insertion order, but must occasionally be
/// dependency-ordered (definitions before their instancers), or walked to check
/// whether adding an edge would close a cycle.
///
/// Implementers are *processors*, typically borrowing the graph they order.
/// The single required method `process` visits one `Item`,
/// passing each of its direct dependencies to `orderer.push`.
/// [DepOrderer::push] recurses depth-first, and reports cycles through `fail`.
///
/// Typical usage:
///
/// ```rust
/// use std::collections::HashMap;
/// use arch21utils::{DepOrder, DepOrderer};
///
/// struct Graph(HashMap<&'static str, Vec<&'static str>>);
/// impl DepOrder for Graph {
///     type Item = &'static str;
///     type Error = String;
///
///     fn process(&self, item: &Self::Item, orderer: &mut DepOrderer<Self>) -> Result<(), String> {
///         for dep in self.0.get(item).into_iter().flatten() {
///             orderer.push(dep)?;
///         }
///         Ok(())
///     }
///     fn fail(&self, item: &Self::Item) -> String {
///         format!("cycle through {}", item)
///     }
/// }
///
/// let g = Graph(HashMap::from([("top", vec!["lut", "ff"]), ("ff", vec!["lut"])]));
/// assert_eq!(g.order(&["top"]).unwrap(), vec!["lut", "ff", "top"]);
/// ```
///
pub trait DepOrder: Sized {
    /// Item Type. Typically keys to the nodes in the dependency graph.
    type Item: Clone + Eq + std::hash::Hash;
    /// Error Type
    type Error;

    /// Dependency-order all entries in slice `items`, plus everything they depend upon
    fn order(&self, items: &[Self::Item]) -> Result<Vec<Self::Item>, Self::Error> {
        DepOrderer::new(self).order(items)
    }

    /// Process a single `item`, pushing each of its direct dependencies
    fn process(&self, item: &Self::Item, orderer: &mut DepOrderer<Self>) -> Result<(), Self::Error>;
    /// Create the error for a cycle detected at `item`
    fn fail(&self, item: &Self::Item) -> Self::Error;
}

/// # Dependency Order Helper
/// Public for use in the call-signature of [DepOrder::process].
pub struct DepOrderer<'p, P: DepOrder> {
    /// Item processor
    processor: &'p P,
    /// Ordered, completed items
    stack: Vec<P::Item>,
    /// Completed items, for quick membership tests
    seen: HashSet<P::Item>,
    /// Items with an open stack-frame, for cycle detection
    pending: HashSet<P::Item>,
}
impl<'p, P: DepOrder> DepOrderer<'p, P> {
    fn new(processor: &'p P) -> Self {
        Self {
            processor,
            stack: Vec::new(),
            seen: HashSet::new(),
            pending: HashSet::new(),
        }
    }
    fn order(mut self, items: &[P::Item]) -> Result<Vec<P::Item>, P::Error> {
        for item in items.iter() {
            self.push(item)?;
        }
        Ok(self.stack)
    }
    /// Push `item`'s dependencies, and then itself, onto the stack
    pub fn push(&mut self, item: &P::Item) -> Result<(), P::Error> {
        if self.seen.contains(item) {
            return Ok(());
        }
        // Being in the pending-set means `item` depends on itself
        if !self.pending.insert(item.clone()) {
            return Err(self.processor.fail(item));
        }
        let processor = self.processor;
        processor.process(item, self)?;
        self.pending.remove(item);
        self.seen.insert(item.clone());
        self.stack.push(item.clone());
        Ok(())
    }
}
