// Booking price calculation. Pure: malformed input (negative counts,
// NaN prices) is the caller's validation problem, not guarded here.

use crate::client::ApiError;
use chrono::NaiveDate;

/// Tax rate applied when a line item carries none of its own.
pub const DEFAULT_TAX_RATE_PERCENT: f64 = 10.0;

/// Upper bound `increment` enforces on any single line item.
pub const MAX_LINE_COUNT: u32 = 5;

/// One bookable unit: a room type, a tour traveler, a transport day.
#[derive(Debug, Clone, PartialEq)]
pub struct BookingLineItem {
    pub unit_price: f64,
    pub count: u32,
    pub tax_rate_percent: Option<f64>,
}

impl BookingLineItem {
    pub fn effective_tax_rate(&self) -> f64 {
        self.tax_rate_percent.unwrap_or(DEFAULT_TAX_RATE_PERCENT)
    }
}

/// Aggregate output of `compute_totals`. `average_tax_rate_percent` is
/// an unweighted mean of the effective per-item rates, rounded to a
/// whole percent, for display only; the summed per-line tax is what
/// goes into `total`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BookingTotals {
    pub subtotal: f64,
    pub tax_amount: f64,
    pub total: f64,
    pub average_tax_rate_percent: u32,
}

/// Computes subtotal, tax and total over the selected line items.
/// `multiplier` is nights for hotels, days for transport, 1 for tours.
/// Each line's tax is rounded independently before summation, matching
/// line-item receipt conventions.
pub fn compute_totals(items: &[BookingLineItem], multiplier: u32) -> BookingTotals {
    if items.is_empty() {
        return BookingTotals::default();
    }

    let mut subtotal = 0.0;
    let mut tax_amount = 0.0;
    let mut rate_sum = 0.0;

    for item in items {
        let line_subtotal = item.unit_price * item.count as f64 * multiplier as f64;
        let line_tax = (line_subtotal * item.effective_tax_rate() / 100.0).round();
        subtotal += line_subtotal;
        tax_amount += line_tax;
        rate_sum += item.effective_tax_rate();
    }

    BookingTotals {
        subtotal,
        tax_amount,
        total: subtotal + tax_amount,
        average_tax_rate_percent: (rate_sum / items.len() as f64).round() as u32,
    }
}

/// Nights between check-in and check-out, or a field-scoped validation
/// error when the range is not strictly positive. The result is the
/// `multiplier` for hotel totals.
pub fn nights_between(check_in: NaiveDate, check_out: NaiveDate) -> Result<u32, ApiError> {
    let nights = (check_out - check_in).num_days();
    if nights <= 0 {
        return Err(ApiError::validation(
            "checkOut",
            "Check-out date must be after check-in date",
        ));
    }
    Ok(nights as u32)
}

/// A line item inside a selection, addressable by the id of the room
/// type / traveler category / vehicle it was added for.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectedLine {
    pub id: String,
    pub item: BookingLineItem,
}

/// The booking UI's working set of line items. Counts are only ever
/// changed through `increment` / `decrement` / `remove`, which keep
/// every entry inside `1..=MAX_LINE_COUNT`; deleting an entry is an
/// explicit `remove`, never a decrement below one.
#[derive(Debug, Default)]
pub struct BookingSelection {
    lines: Vec<SelectedLine>,
}

impl BookingSelection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a line with count 1, or increments the existing line for
    /// the same id.
    pub fn add(&mut self, id: &str, unit_price: f64, tax_rate_percent: Option<f64>) {
        if self.lines.iter().any(|line| line.id == id) {
            self.increment(id);
            return;
        }
        self.lines.push(SelectedLine {
            id: id.to_string(),
            item: BookingLineItem {
                unit_price,
                count: 1,
                tax_rate_percent,
            },
        });
    }

    /// Returns false when the line is missing or already at the cap.
    pub fn increment(&mut self, id: &str) -> bool {
        match self.line_mut(id) {
            Some(item) if item.count < MAX_LINE_COUNT => {
                item.count += 1;
                true
            }
            _ => false,
        }
    }

    /// Returns false when the line is missing or already at one.
    pub fn decrement(&mut self, id: &str) -> bool {
        match self.line_mut(id) {
            Some(item) if item.count > 1 => {
                item.count -= 1;
                true
            }
            _ => false,
        }
    }

    /// Returns false when no line with this id exists.
    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.lines.len();
        self.lines.retain(|line| line.id != id);
        self.lines.len() < before
    }

    pub fn lines(&self) -> &[SelectedLine] {
        &self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn totals(&self, multiplier: u32) -> BookingTotals {
        let items: Vec<BookingLineItem> =
            self.lines.iter().map(|line| line.item.clone()).collect();
        compute_totals(&items, multiplier)
    }

    fn line_mut(&mut self, id: &str) -> Option<&mut BookingLineItem> {
        self.lines
            .iter_mut()
            .find(|line| line.id == id)
            .map(|line| &mut line.item)
    }
}
