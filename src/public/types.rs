use std::collections::HashMap;

/// Milliseconds since the epoch, `0` when the sample carried no timestamp.
pub type Timestamp = i64;

pub type Labels = HashMap<String, String>;
