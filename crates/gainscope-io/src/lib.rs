pub mod csv_io;
pub mod error;
pub mod model_io;

pub use csv_io::{read_dataset, read_predictions, write_predictions, write_table, Column, Table};
pub use error::{IoError, IoResult};
pub use model_io::{load_model, save_model};
