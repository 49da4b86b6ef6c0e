use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

use crate::{
    dao::{AdapterContext, DaoAdapter, StblAdapter},
    models::{DaoDescriptor, EngineError, Result},
};

pub type AdapterConstructor = fn(DaoDescriptor, AdapterContext) -> Result<Arc<dyn DaoAdapter>>;

/// Maps a DAO symbol to its adapter implementation.
pub struct DaoFactory {
    context: AdapterContext,
    constructors: HashMap<&'static str, AdapterConstructor>,
}

impl DaoFactory {
    pub fn new(context: AdapterContext) -> Self {
        let mut factory = Self {
            context,
            constructors: HashMap::new(),
        };
        factory.register(StblAdapter::SYMBOL, StblAdapter::construct);
        factory
    }

    pub fn register(&mut self, symbol: &'static str, constructor: AdapterConstructor) {
        self.constructors.insert(symbol, constructor);
    }

    pub fn context(&self) -> &AdapterContext {
        &self.context
    }

    /// `Ok(None)` for an unknown symbol on a DAO that is not live yet;
    /// an unknown symbol on a live DAO is a configuration bug.
    pub fn create(&self, dao: &DaoDescriptor) -> Result<Option<Arc<dyn DaoAdapter>>> {
        match self.constructors.get(dao.symbol.as_str()) {
            Some(constructor) => constructor(dao.clone(), self.context.clone()).map(Some),
            None if dao.is_live() => Err(EngineError::AdapterNotImplemented {
                name: dao.name.clone(),
                symbol: dao.symbol.clone(),
            }),
            None => {
                debug!("No adapter for {} yet ({:?})", dao.symbol, dao.phase);
                Ok(None)
            }
        }
    }
}
