// Spreadsheet I/O: whole-file read into a Dataset, whole-file export back to
// xlsx bytes. No streaming, no persistence beyond the returned buffers.

pub mod reader;
pub mod writer;

pub use reader::read_workbook;
pub use writer::write_workbook;
