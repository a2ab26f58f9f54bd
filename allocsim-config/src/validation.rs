//! Custom validation functions shared by the configuration modules.

use validator::ValidationError;

use crate::generator::GeneratorConfig;

/// Cross-field checks the derive attributes cannot express.
pub fn validate_generator(config: &GeneratorConfig) -> Result<(), ValidationError> {
    if config.size_min > config.size_max {
        let mut error = ValidationError::new("size_range");
        error.message = Some("size_min must not exceed size_max".into());
        return Err(error);
    }

    // With fewer addresses than the free threshold, the collision retry loop
    // can reach a state where every address is live and no candidate can
    // ever succeed.
    if config.address_space < config.live_threshold as u64 {
        let mut error = ValidationError::new("address_space");
        error.message = Some("address_space must be at least live_threshold".into());
        return Err(error);
    }

    Ok(())
}
