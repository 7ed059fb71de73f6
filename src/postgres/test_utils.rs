use super::types::{ChangeOperation, ChangePayload, Column, RawRecord};

/// Mock change-event builder for testing the record decoder
pub struct MockPayloadBuilder {
    schema: String,
    table: String,
    op: ChangeOperation,
    columns: Vec<Column>,
    record: Option<RawRecord>,
    old_record: Option<RawRecord>,
}

impl MockPayloadBuilder {
    pub fn new(op: ChangeOperation) -> Self {
        Self {
            schema: "public".to_string(),
            table: "users".to_string(),
            op,
            columns: Vec::new(),
            record: None,
            old_record: None,
        }
    }

    pub fn with_table(mut self, schema: &str, table: &str) -> Self {
        self.schema = schema.to_string();
        self.table = table.to_string();
        self
    }

    pub fn column(mut self, name: &str, type_tag: &str) -> Self {
        self.columns.push(Column::new(name, type_tag));
        self
    }

    pub fn record(mut self, values: Vec<(&str, Option<&str>)>) -> Self {
        self.record = Some(raw_record(values));
        self
    }

    pub fn old_record(mut self, values: Vec<(&str, Option<&str>)>) -> Self {
        self.old_record = Some(raw_record(values));
        self
    }

    pub fn build(self) -> ChangePayload {
        ChangePayload {
            schema: self.schema,
            table: self.table,
            op: self.op,
            commit_timestamp: Some("2023-10-15T10:30:00Z".to_string()),
            columns: self.columns,
            record: self.record,
            old_record: self.old_record,
        }
    }
}

pub fn raw_record(values: Vec<(&str, Option<&str>)>) -> RawRecord {
    values
        .into_iter()
        .map(|(name, value)| (name.to_string(), value.map(str::to_string)))
        .collect()
}
