//! In-memory source and destination tables for exercising the copy procedure.
//!
//! # Invariants
//! - `FakeDestination` keeps committed rows separate from the open transaction,
//!   so rollback restores exactly what was committed.

use async_trait::async_trait;
use mobius_replicator::{DestinationTable, ReplicateError, Result, Row, SourceTable, TableRef};

pub fn cols(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

pub fn row(values: &[Option<&str>]) -> Row {
    values.iter().map(|v| v.map(str::to_string)).collect()
}

/// `n` rows of `(id, text, embedding)`; every seventh text is NULL.
#[allow(dead_code)]
pub fn sample_rows(n: usize) -> Vec<Row> {
    (0..n)
        .map(|i| {
            let text = (i % 7 != 0).then(|| format!("chunk {i}"));
            vec![
                Some(i.to_string()),
                text,
                Some(format!("[{i}.0,{}.5]", i + 1)),
            ]
        })
        .collect()
}

#[derive(Debug, Default)]
pub struct FakeSource {
    pub columns: Vec<String>,
    pub rows: Vec<Row>,
    pub in_snapshot: bool,
    pub commits: usize,
    pub rollbacks: usize,
    pub fetch_sizes: Vec<usize>,
    stream: Option<(Vec<usize>, usize)>,
}

impl FakeSource {
    pub fn new(columns: Vec<String>, rows: Vec<Row>) -> Self {
        Self {
            columns,
            rows,
            ..Default::default()
        }
    }
}

#[async_trait]
impl SourceTable for FakeSource {
    async fn begin_snapshot(&mut self) -> Result<()> {
        self.in_snapshot = true;
        Ok(())
    }

    async fn columns(&mut self, _table: &TableRef) -> Result<Vec<String>> {
        Ok(self.columns.clone())
    }

    async fn count_rows(&mut self, _table: &TableRef) -> Result<u64> {
        Ok(self.rows.len() as u64)
    }

    async fn open_stream(&mut self, _table: &TableRef, columns: &[String]) -> Result<()> {
        let indices = columns
            .iter()
            .map(|c| {
                self.columns
                    .iter()
                    .position(|s| s == c)
                    .ok_or_else(|| ReplicateError::Config(format!("unknown column {c}")))
            })
            .collect::<Result<Vec<_>>>()?;
        self.stream = Some((indices, 0));
        Ok(())
    }

    async fn fetch(&mut self, max_rows: usize) -> Result<Vec<Row>> {
        self.fetch_sizes.push(max_rows);
        let Some((indices, position)) = self.stream.as_mut() else {
            return Ok(Vec::new());
        };
        let end = (*position + max_rows).min(self.rows.len());
        let chunk = self.rows[*position..end]
            .iter()
            .map(|r| indices.iter().map(|&i| r[i].clone()).collect())
            .collect();
        *position = end;
        Ok(chunk)
    }

    async fn commit(&mut self) -> Result<()> {
        self.in_snapshot = false;
        self.commits += 1;
        Ok(())
    }

    async fn rollback(&mut self) -> Result<()> {
        self.in_snapshot = false;
        self.stream = None;
        self.rollbacks += 1;
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct FakeDestination {
    pub columns: Vec<String>,
    pub committed: Vec<Row>,
    pub truncates: usize,
    pub commits: usize,
    pub rollbacks: usize,
    pub insert_pages: Vec<usize>,
    /// Fail the insert call with this zero-based index.
    pub fail_on_insert: Option<usize>,
    working: Option<Vec<Row>>,
}

impl FakeDestination {
    pub fn new(columns: Vec<String>, committed: Vec<Row>) -> Self {
        Self {
            columns,
            committed,
            ..Default::default()
        }
    }

    pub fn in_transaction(&self) -> bool {
        self.working.is_some()
    }
}

#[async_trait]
impl DestinationTable for FakeDestination {
    async fn begin(&mut self) -> Result<()> {
        self.working = Some(self.committed.clone());
        Ok(())
    }

    async fn columns(&mut self, _table: &TableRef) -> Result<Vec<String>> {
        Ok(self.columns.clone())
    }

    async fn count_rows(&mut self, _table: &TableRef) -> Result<u64> {
        Ok(self.working.as_ref().unwrap_or(&self.committed).len() as u64)
    }

    async fn truncate(&mut self, _table: &TableRef) -> Result<()> {
        self.truncates += 1;
        self.working = Some(Vec::new());
        Ok(())
    }

    async fn insert_rows(
        &mut self,
        _table: &TableRef,
        columns: &[String],
        rows: &[Row],
    ) -> Result<u64> {
        let call = self.insert_pages.len();
        self.insert_pages.push(rows.len());
        if self.fail_on_insert == Some(call) {
            return Err(ReplicateError::Config(
                "injected insert failure".to_string(),
            ));
        }
        assert_eq!(columns, self.columns.as_slice());
        let working = self
            .working
            .as_mut()
            .ok_or_else(|| ReplicateError::Config("insert outside transaction".to_string()))?;
        working.extend(rows.iter().cloned());
        Ok(rows.len() as u64)
    }

    async fn commit(&mut self) -> Result<()> {
        if let Some(rows) = self.working.take() {
            self.committed = rows;
        }
        self.commits += 1;
        Ok(())
    }

    async fn rollback(&mut self) -> Result<()> {
        self.working = None;
        self.rollbacks += 1;
        Ok(())
    }
}
