#[derive(Debug, Clone, PartialEq)]
pub struct CsvSettings {
    pub delimiter: char,
}

impl CsvSettings {
    pub fn new(delimiter: char) -> Self {
        CsvSettings { delimiter }
    }
}

impl Default for CsvSettings {
    fn default() -> Self {
        CsvSettings { delimiter: ',' }
    }
}
