//! `CryptoManager`: a name-keyed registry of cipher suites plus the
//! currently-negotiated selection.
//!
//! Ground truth: `examples/original_source/final/crypto/crypto_manager.py`.

use crate::context::SecureContext;
use crate::error::{Error, Result};
use std::collections::HashMap;

/// Holds every symmetric and PKC suite this side of a connection supports,
/// and tracks which ones were negotiated with a particular peer.
#[derive(Default)]
pub struct CryptoManager {
    symmetric_contexts: HashMap<String, SecureContext>,
    public_contexts: HashMap<String, SecureContext>,
    private_contexts: HashMap<String, SecureContext>,

    selected_symmetric: Option<String>,
    selected_public: Option<String>,
    selected_private: Option<String>,
}

impl CryptoManager {
    /// Creates an empty manager.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a symmetric suite under its own name.
    pub fn add_symmetric_context(&mut self, context: SecureContext) {
        let name = context.name();
        log::debug!("adding symmetric context: {name}");
        self.symmetric_contexts.insert(name, context);
    }

    /// Registers a public/private PKC suite pair. Both halves must report
    /// the same name.
    pub fn add_pkc_contexts(
        &mut self,
        public: SecureContext,
        private: SecureContext,
    ) -> Result<()> {
        let public_name = public.name();
        let private_name = private.name();
        if public_name != private_name {
            return Err(Error::NameMismatch {
                public: public_name,
                private: private_name,
            });
        }
        log::debug!("adding PKC contexts: {public_name}");
        self.private_contexts.insert(private_name, private);
        self.public_contexts.insert(public_name, public);
        Ok(())
    }

    fn highest_priority_match(
        candidates: &[String],
        registry: &HashMap<String, SecureContext>,
    ) -> Option<String> {
        let mut matches: Vec<(u32, &String)> = candidates
            .iter()
            .filter_map(|name| registry.get(name).map(|ctx| (ctx.priority(), name)))
            .collect();
        matches.sort_by_key(|(priority, _)| *priority);
        matches.last().map(|(_, name)| (*name).clone())
    }

    /// Intersects the client's offered PKC and symmetric suite names against
    /// what this manager supports, selecting the highest-priority match in
    /// each category. The selection triple is committed only when all three
    /// categories -- public, private, symmetric -- have a match; otherwise
    /// any prior selection is cleared and this returns `false`.
    pub fn choose_algorithms(&mut self, client_pkc: &[String], client_symmetric: &[String]) -> bool {
        for name in client_pkc {
            if !self.public_contexts.contains_key(name) {
                log::debug!("rejecting offered PKC candidate not in our registry: {name}");
            }
        }
        for name in client_symmetric {
            if !self.symmetric_contexts.contains_key(name) {
                log::debug!("rejecting offered symmetric candidate not in our registry: {name}");
            }
        }

        let public = Self::highest_priority_match(client_pkc, &self.public_contexts);
        let private = Self::highest_priority_match(client_pkc, &self.private_contexts);
        let symmetric = Self::highest_priority_match(client_symmetric, &self.symmetric_contexts);

        let chosen = public.is_some() && private.is_some() && symmetric.is_some();
        if chosen {
            log::info!(
                "choosing cryptosystems: PKC: {}, Symmetric: {}",
                public.as_deref().unwrap_or(""),
                symmetric.as_deref().unwrap_or("")
            );
            self.selected_public = public;
            self.selected_private = private;
            self.selected_symmetric = symmetric;
        } else {
            self.selected_public = None;
            self.selected_private = None;
            self.selected_symmetric = None;
        }
        chosen
    }

    /// Selects suites by name directly, bypassing negotiation.
    pub fn set_algorithms(&mut self, pkc_name: &str, symmetric_name: &str) {
        log::info!("using cryptosystems: PKC: {pkc_name}, Symmetric: {symmetric_name}");
        self.selected_public = Some(pkc_name.to_string());
        self.selected_private = Some(pkc_name.to_string());
        self.selected_symmetric = Some(symmetric_name.to_string());
    }

    /// The currently selected symmetric context, if any.
    pub fn get_symmetric(&mut self) -> Option<&mut SecureContext> {
        let name = self.selected_symmetric.clone()?;
        self.symmetric_contexts.get_mut(&name)
    }

    /// The currently selected `(public, private)` PKC context pair.
    pub fn get_pkc(&mut self) -> (Option<&mut SecureContext>, Option<&mut SecureContext>) {
        let public_name = self.selected_public.clone();
        let private_name = self.selected_private.clone();
        let public = public_name.and_then(|n| self.public_contexts.get_mut(&n));
        let private = private_name.and_then(|n| self.private_contexts.get_mut(&n));
        (public, private)
    }

    /// The currently selected `(symmetric, public, private)` contexts
    /// together, for call sites (the handshake) that need more than one at
    /// once and can't take two overlapping `&mut self` borrows to get them.
    pub fn selected_contexts(
        &mut self,
    ) -> (
        Option<&mut SecureContext>,
        Option<&mut SecureContext>,
        Option<&mut SecureContext>,
    ) {
        let symmetric_name = self.selected_symmetric.clone();
        let public_name = self.selected_public.clone();
        let private_name = self.selected_private.clone();
        let symmetric = symmetric_name.and_then(|n| self.symmetric_contexts.get_mut(&n));
        let public = public_name.and_then(|n| self.public_contexts.get_mut(&n));
        let private = private_name.and_then(|n| self.private_contexts.get_mut(&n));
        (symmetric, public, private)
    }

    /// Names of every registered symmetric suite.
    pub fn supported_symmetric(&self) -> Vec<String> {
        self.symmetric_contexts.keys().cloned().collect()
    }

    /// Names of every registered PKC suite.
    pub fn supported_pkcs(&self) -> Vec<String> {
        self.public_contexts.keys().cloned().collect()
    }

    /// Installs `key` as the MAC key on every registered context.
    pub fn set_mac_keys(&mut self, key: Vec<u8>) {
        for context in self.symmetric_contexts.values_mut() {
            context.set_mac_key(key.clone());
        }
        for context in self.public_contexts.values_mut() {
            context.set_mac_key(key.clone());
        }
        for context in self.private_contexts.values_mut() {
            context.set_mac_key(key.clone());
        }
    }
}
