/// Store-assigned job identifier. Integer and UUID keys are both carried as text.
pub type JobId = String;

/// Subject identifier returned by the identity service.
pub type UserId = String;
