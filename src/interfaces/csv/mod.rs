pub mod mapping_reader;
pub mod mapping_writer;
