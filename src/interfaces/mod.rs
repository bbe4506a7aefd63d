pub mod csv;
pub mod enrich;
pub mod ids_reader;
