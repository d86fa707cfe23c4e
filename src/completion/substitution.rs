//! Substitution group expansion
//!
//! Content models name the head of a substitution group; completion offers
//! the head together with the elements declared as its members.

use indexmap::IndexSet;
use std::sync::Arc;

use crate::grammar::globals::{ElementDeclId, Grammar};

use super::cache::ElementDeclaration;

/// Expands substitution group heads through the declaration cache
#[derive(Debug, Clone)]
pub struct SubstitutionResolver {
    grammar: Arc<Grammar>,
}

impl SubstitutionResolver {
    /// Create a resolver for a grammar
    pub fn new(grammar: Arc<Grammar>) -> Self {
        Self { grammar }
    }

    /// Members declared directly for `head`, in declaration order
    pub fn expand(&self, head: ElementDeclId) -> Vec<Arc<ElementDeclaration>> {
        self.grammar
            .substitution_group_of(head)
            .iter()
            .filter_map(|member| self.grammar.declaration(*member))
            .collect()
    }

    /// Members of `head` and, transitively, of its members
    pub fn expand_recursive(&self, head: ElementDeclId) -> Vec<Arc<ElementDeclaration>> {
        let mut seen = IndexSet::new();
        let mut pending = vec![head];
        while let Some(current) = pending.pop() {
            for member in self.grammar.substitution_group_of(current).iter().rev() {
                if *member != head && !seen.contains(member) {
                    pending.push(*member);
                }
            }
            if current != head {
                seen.insert(current);
            }
        }
        seen.into_iter()
            .filter_map(|member| self.grammar.declaration(member))
            .collect()
    }
}
