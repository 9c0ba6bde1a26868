pub struct Length(pub f64);
