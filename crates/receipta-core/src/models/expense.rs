//! Categorized expense records and their filters.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::invoice::{DocumentType, ExtractedInvoice};

/// Expense category.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExpenseCategory {
    /// Car and fuel (רכב).
    #[serde(rename = "רכב", alias = "vehicle")]
    Vehicle,
    /// Food (מזון).
    #[serde(rename = "מזון", alias = "food")]
    Food,
    /// Operations (תפעול).
    #[serde(rename = "תפעול", alias = "operations")]
    Operations,
    /// IT and software.
    #[serde(rename = "IT", alias = "it")]
    It,
    /// Training and courses (הדרכה/הכשרה).
    #[serde(rename = "הדרכה/הכשרה", alias = "training")]
    Training,
    /// Anything else (אחר).
    #[default]
    #[serde(rename = "אחר", alias = "other")]
    Other,
}

impl ExpenseCategory {
    pub const ALL: [ExpenseCategory; 6] = [
        ExpenseCategory::Vehicle,
        ExpenseCategory::Food,
        ExpenseCategory::Operations,
        ExpenseCategory::It,
        ExpenseCategory::Training,
        ExpenseCategory::Other,
    ];

    /// Hebrew label used by the ledger.
    pub fn label(&self) -> &'static str {
        match self {
            ExpenseCategory::Vehicle => "רכב",
            ExpenseCategory::Food => "מזון",
            ExpenseCategory::Operations => "תפעול",
            ExpenseCategory::It => "IT",
            ExpenseCategory::Training => "הדרכה/הכשרה",
            ExpenseCategory::Other => "אחר",
        }
    }

    fn name(&self) -> &'static str {
        match self {
            ExpenseCategory::Vehicle => "vehicle",
            ExpenseCategory::Food => "food",
            ExpenseCategory::Operations => "operations",
            ExpenseCategory::It => "it",
            ExpenseCategory::Training => "training",
            ExpenseCategory::Other => "other",
        }
    }

    /// Parse from the Hebrew label or the English name.
    pub fn from_str(s: &str) -> Option<Self> {
        let s = s.trim();
        let lower = s.to_lowercase();

        Self::ALL
            .into_iter()
            .find(|c| c.label() == s || c.name() == lower)
    }
}

/// An extracted document booked as an expense.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expense {
    pub category: ExpenseCategory,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,

    pub document_type: DocumentType,
    pub business_name: String,
    pub business_vat_number: String,
    pub amount_before_vat: Decimal,
    pub amount_after_vat: Decimal,
    pub transaction_date: NaiveDate,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub invoice_number: Option<String>,
}

impl Expense {
    /// Book an extracted document under a category.
    pub fn from_invoice(
        invoice: ExtractedInvoice,
        category: ExpenseCategory,
        notes: Option<String>,
    ) -> Self {
        Self {
            category,
            notes,
            document_type: invoice.document_type,
            business_name: invoice.business_name,
            business_vat_number: invoice.business_vat_number,
            amount_before_vat: invoice.amount_before_vat,
            amount_after_vat: invoice.amount_after_vat,
            transaction_date: invoice.transaction_date,
            invoice_number: invoice.invoice_number,
        }
    }
}

/// Expense listing filter. Unset fields do not constrain.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExpenseFilter {
    /// Earliest transaction date (inclusive).
    pub start_date: Option<NaiveDate>,

    /// Latest transaction date (inclusive).
    pub end_date: Option<NaiveDate>,

    /// Minimum total after VAT (inclusive).
    pub min_amount: Option<Decimal>,

    /// Maximum total after VAT (inclusive).
    pub max_amount: Option<Decimal>,

    /// Exact category.
    pub category: Option<ExpenseCategory>,

    /// Case-insensitive substring of the vendor name.
    pub business_name: Option<String>,
}

impl ExpenseFilter {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Check whether an expense passes every set constraint.
    pub fn matches(&self, expense: &Expense) -> bool {
        if let Some(category) = self.category {
            if expense.category != category {
                return false;
            }
        }

        if let Some(start) = self.start_date {
            if expense.transaction_date < start {
                return false;
            }
        }

        if let Some(end) = self.end_date {
            if expense.transaction_date > end {
                return false;
            }
        }

        if let Some(min) = self.min_amount {
            if expense.amount_after_vat < min {
                return false;
            }
        }

        if let Some(max) = self.max_amount {
            if expense.amount_after_vat > max {
                return false;
            }
        }

        if let Some(name) = &self.business_name {
            let needle = name.trim().to_lowercase();
            if !expense.business_name.to_lowercase().contains(&needle) {
                return false;
            }
        }

        true
    }

    /// Keep the matching expenses, in input order.
    pub fn apply<'a, I>(&self, expenses: I) -> Vec<&'a Expense>
    where
        I: IntoIterator<Item = &'a Expense>,
    {
        expenses.into_iter().filter(|e| self.matches(e)).collect()
    }
}
