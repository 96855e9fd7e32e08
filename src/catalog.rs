//! Variable catalog
//!
//! Flattens the design hierarchy into an ordered list of leaf signals by
//! walking instance scopes with typed `show` listings.

use futures::future::{BoxFuture, FutureExt};
use std::collections::HashSet;

use crate::models::variable::parse_scope_entry;
use crate::models::Variable;
use crate::protocol::commands;
use crate::session::SessionController;

/// Enumerates the signals of a session's design
#[derive(Debug, Clone)]
pub struct VariableCatalog {
    session: SessionController,
}

#[derive(Default)]
struct Walk {
    visited: HashSet<String>,
    emitted: HashSet<String>,
    variables: Vec<Variable>,
}

impl VariableCatalog {
    pub fn new(session: SessionController) -> Self {
        Self { session }
    }

    /// Every leaf signal, depth first in engine order
    ///
    /// Instance scopes are recursed into and never returned themselves.
    /// An engine that has terminated yields an empty list.
    pub async fn list_vars(&self) -> Vec<Variable> {
        let mut walk = Walk::default();
        self.walk_scope(None, &mut walk).await;
        debug!("Catalog holds {} variables", walk.variables.len());
        walk.variables
    }

    fn walk_scope<'a>(&'a self, scope: Option<String>, walk: &'a mut Walk) -> BoxFuture<'a, ()> {
        async move {
            let listing = self
                .session
                .try_execute(&commands::show_typed(scope.as_deref()))
                .await;

            for line in &listing {
                let Some(mut entry) = parse_scope_entry(line) else {
                    continue;
                };
                if entry.is_placeholder() {
                    continue;
                }
                if let Some(parent) = &scope {
                    let prefix = format!("{}.", parent);
                    if !entry.name.starts_with(&prefix) {
                        entry.name = format!("{}{}", prefix, entry.name);
                    }
                }

                if entry.is_instance() {
                    if walk.visited.insert(entry.name.clone()) {
                        self.walk_scope(Some(entry.name), walk).await;
                    } else {
                        debug!("Scope '{}' already visited", entry.name);
                    }
                } else if walk.emitted.insert(entry.name.clone()) {
                    walk.variables.push(entry);
                }
            }
        }
        .boxed()
    }
}
