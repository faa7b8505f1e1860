pub enum Action {
    HealthCheck(),
    Submit(String),
}
