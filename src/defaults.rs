pub const DEPOT_PREFIX: &str = "DEPOT";

pub const DEFAULT_DB_NAME: &str = "INC4.csv";
pub const DEFAULT_TIME_LIMIT_SECONDS: u64 = 30;
pub const DEFAULT_CAPACITY: u32 = 45;
pub const DEFAULT_SERVICE_TIME_MINUTES: u64 = 1;

pub const DEFAULT_OPTIMIZER_TIMEOUT_SECONDS: u64 = 30;
