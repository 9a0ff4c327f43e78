//! JSON configuration entry points and error conversion for JS

use wasm_bindgen::prelude::*;

use super::hand_joints::{with_pipeline, HandsBusy};
use crate::pointer::{ConfigError, Hand, PointerConfig, PointerError};

// ============================================================================
// ERROR CONVERSION
// ============================================================================

impl From<PointerError> for JsValue {
    fn from(err: PointerError) -> Self {
        js_sys::Error::new(&err.to_string()).into()
    }
}

impl From<ConfigError> for JsValue {
    fn from(err: ConfigError) -> Self {
        js_sys::Error::new(&err.to_string()).into()
    }
}

impl From<HandsBusy> for JsValue {
    fn from(err: HandsBusy) -> Self {
        js_sys::Error::new(&err.to_string()).into()
    }
}

/// Validate JSON into a config without touching any pipeline
pub(super) fn parse_config(json: &str) -> Result<PointerConfig, ConfigError> {
    PointerConfig::from_json(json)
}

// ============================================================================
// WASM API
// ============================================================================

/// Replace one hand's pointer configuration. Missing fields keep their
/// defaults. The hand's filter and selection restart.
#[wasm_bindgen]
pub fn configure_pointer(hand: usize, json: &str) -> Result<(), JsValue> {
    let hand = Hand::from_index(hand)?;
    let config = parse_config(json)?;
    with_pipeline(hand, |pipeline| pipeline.set_config(config))??;
    web_sys::console::log_1(&format!("pointer configured for {} hand", hand.as_str()).into());
    Ok(())
}

/// Current configuration of one hand as JSON
#[wasm_bindgen]
pub fn get_pointer_config(hand: usize) -> Result<String, JsValue> {
    let hand = Hand::from_index(hand)?;
    let config = with_pipeline(hand, |pipeline| pipeline.config().clone())?;
    serde_json::to_string(&config).map_err(|e| JsValue::from(ConfigError::from(e)))
}
