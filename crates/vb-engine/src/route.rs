use crate::error::EngineError;

/// The single outbound route a client may have active under its tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteSlot {
    tag: String,
    active: Option<String>,
}

impl RouteSlot {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            active: None,
        }
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Label of the endpoint currently routed, if any.
    pub fn active(&self) -> Option<&str> {
        self.active.as_deref()
    }

    pub fn ensure_free(&self) -> Result<(), EngineError> {
        match &self.active {
            Some(active) => Err(EngineError::RouteOccupied {
                tag: self.tag.clone(),
                active: active.clone(),
            }),
            None => Ok(()),
        }
    }

    pub fn occupy(&mut self, label: &str) {
        self.active = Some(label.to_string());
    }

    pub fn release(&mut self) -> Option<String> {
        self.active.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn occupy_then_release() {
        let mut slot = RouteSlot::new("proxy");
        assert!(slot.ensure_free().is_ok());

        slot.occupy("hk-01");
        assert_eq!(slot.active(), Some("hk-01"));
        assert!(matches!(
            slot.ensure_free(),
            Err(EngineError::RouteOccupied { ref active, .. }) if active == "hk-01"
        ));

        assert_eq!(slot.release().as_deref(), Some("hk-01"));
        assert!(slot.ensure_free().is_ok());
        assert_eq!(slot.release(), None);
    }
}
