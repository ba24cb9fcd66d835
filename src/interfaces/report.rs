use crate::domain::order::Order;
use crate::error::Result;
use rust_decimal::Decimal;
use serde::Serialize;
use std::io::Write;

/// Output encoding for order reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum ReportFormat {
    #[default]
    Csv,
    Json,
}

/// Flat view of an order for display: the status as its wire value plus its
/// label and presentation class.
#[derive(Debug, Serialize, PartialEq)]
pub struct OrderRecord {
    pub id: u64,
    pub user_id: u64,
    pub amount: Decimal,
    pub status: &'static str,
    pub status_label: &'static str,
    pub status_class: &'static str,
}

impl From<&Order> for OrderRecord {
    fn from(order: &Order) -> Self {
        Self {
            id: order.id.0,
            user_id: order.user_id.0,
            amount: order.amount.value(),
            status: order.status.as_str(),
            status_label: order.status.label(),
            status_class: order.status.css_class(),
        }
    }
}

/// Writes orders to any `Write` sink (e.g., Stdout, File).
pub struct OrderWriter<W: Write> {
    sink: W,
    format: ReportFormat,
}

impl<W: Write> OrderWriter<W> {
    pub fn new(sink: W, format: ReportFormat) -> Self {
        Self { sink, format }
    }

    /// CSV output carries a header row; JSON output is one array.
    pub fn write_orders<'a, I>(&mut self, orders: I) -> Result<()>
    where
        I: IntoIterator<Item = &'a Order>,
    {
        let records: Vec<OrderRecord> = orders.into_iter().map(OrderRecord::from).collect();
        match self.format {
            ReportFormat::Csv => {
                let mut writer = csv::WriterBuilder::new()
                    .has_headers(true)
                    .from_writer(&mut self.sink);
                for record in &records {
                    writer.serialize(record)?;
                }
                writer.flush()?;
            }
            ReportFormat::Json => {
                serde_json::to_writer_pretty(&mut self.sink, &records)?;
                writeln!(self.sink)?;
            }
        }
        Ok(())
    }
}
