// src/services/export_service.rs

use crate::{
    common::{error::AppError, parse::DATE_FORMAT},
    models::{
        receipt::{DateScope, Receipt, ReceiptFilter, ReceiptItem},
        summary::ExportFile,
    },
    services::receipt_service::ReceiptService,
};

const CSV_HEADER: &str = "Date,Time,Receipt ID,Customer,Total Weight (kg),Total Labor Cost,Items";

#[derive(Clone)]
pub struct ExportService {
    receipts: ReceiptService,
}

impl ExportService {
    pub fn new(receipts: ReceiptService) -> Self {
        Self { receipts }
    }

    /// Mesmo filtro e ordem da listagem, renderizado em CSV.
    pub async fn export(&self, filter: &ReceiptFilter) -> Result<ExportFile, AppError> {
        let receipts = self.receipts.list_receipts(filter).await?;
        let file = ExportFile {
            filename: export_filename(filter),
            content: render_csv(&receipts),
            total_records: receipts.len(),
        };
        tracing::debug!(filename = %file.filename, records = file.total_records, "Receipts exported");
        Ok(file)
    }
}

pub fn export_filename(filter: &ReceiptFilter) -> String {
    let base = match filter.scope {
        DateScope::Range { start, end } => format!(
            "receipts_{}_to_{}.csv",
            start.format(DATE_FORMAT),
            end.format(DATE_FORMAT)
        ),
        DateScope::Day(day) => format!("receipts_{}.csv", day.format(DATE_FORMAT)),
        DateScope::All => "all_receipts.csv".to_string(),
    };

    match &filter.customer {
        Some(customer) => format!("receipts_customer_{}_{}", customer, base),
        None => base,
    }
}

pub fn render_csv(receipts: &[Receipt]) -> String {
    let mut out = String::from(CSV_HEADER);
    out.push('\n');

    for receipt in receipts {
        let items = receipt
            .items
            .iter()
            .map(describe_item)
            .collect::<Vec<_>>()
            .join("; ");

        out.push_str(&format!(
            "{},{},{},{},{},{},{}\n",
            receipt.date.format(DATE_FORMAT),
            receipt.time.format("%H:%M:%S"),
            receipt.id,
            csv_escape(receipt.customer_name.as_deref().unwrap_or("")),
            receipt.total_weight.normalize(),
            receipt.total_labor_cost.normalize(),
            quoted(&items),
        ));
    }
    out
}

fn describe_item(item: &ReceiptItem) -> String {
    match item.dimension.as_deref() {
        Some(dimension) => format!("{} ({} kg - {})", item.item_name, item.weight_kg.normalize(), dimension),
        None => format!("{} ({} kg)", item.item_name, item.weight_kg.normalize()),
    }
}

fn csv_escape(value: &str) -> String {
    if value.contains(',') || value.contains('"') || value.contains('\n') {
        quoted(value)
    } else {
        value.to_string()
    }
}

fn quoted(value: &str) -> String {
    format!("\"{}\"", value.replace('"', "\"\""))
}
