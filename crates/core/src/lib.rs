pub mod config;
pub mod ticket;

pub use config::{
    load_config, load_config_from_str, validate_config, Config, ConfigError, ServerConfig,
    StorageConfig,
};
pub use ticket::{FileTicketStore, NewTicket, Ticket, TicketError, TicketStatus, TicketStore};
