pub mod command_reader;
