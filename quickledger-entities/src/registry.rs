//! Entity registry.
//!
//! The fixed catalog of remote resources and the operations the API
//! supports for each. Order matters only for listing.

use std::collections::HashMap;
use std::sync::OnceLock;

use quickledger_core::{Capabilities, RegistryEntry};

// ============================================================================
// Static Table
// ============================================================================

/// Query + create + read + update, no delete.
const QCRU: Capabilities = Capabilities::accounting(true, true, true, true, false);

const fn entity(handle: &'static str, fragment: &'static str, caps: Capabilities) -> RegistryEntry {
    RegistryEntry::accounting(handle, fragment, caps)
}

const fn report(handle: &'static str, name: &'static str) -> RegistryEntry {
    RegistryEntry::report(handle, name, name)
}

/// Every registry entry, transactions first, then lists, then reports.
static ENTRIES: &[RegistryEntry] = &[
    // Transactions
    entity("Bill", "bill", Capabilities::CRUD),
    entity("BillPayment", "billpayment", Capabilities::CRUD),
    entity("CreditMemo", "creditmemo", Capabilities::CRUD),
    entity("Deposit", "deposit", Capabilities::CRUD),
    entity("Estimate", "estimate", Capabilities::CRUD),
    entity("Invoice", "invoice", Capabilities::CRUD),
    entity("JournalEntry", "journalentry", Capabilities::CRUD),
    entity("Payment", "payment", Capabilities::CRUD),
    entity("Purchase", "purchase", Capabilities::CRUD),
    entity("Purchaseorder", "purchaseorder", Capabilities::CRUD),
    entity("RefundReceipt", "refundreceipt", Capabilities::CRUD),
    entity("SalesReceipt", "salesreceipt", Capabilities::CRUD),
    entity("TimeActivity", "timeactivity", Capabilities::CRUD),
    entity("Transfer", "transfer", Capabilities::CRUD),
    entity("VendorCredit", "vendorcredit", Capabilities::CRUD),
    // Lists
    entity("Account", "account", QCRU),
    entity("Budget", "budget", Capabilities::accounting(true, false, true, false, false)),
    entity("Class", "class", QCRU),
    entity("CompanyCurrency", "companycurrency", Capabilities::CRUD),
    entity("Customer", "customer", QCRU),
    entity("Department", "department", QCRU),
    entity("Employee", "employee", QCRU),
    entity("Item", "item", QCRU),
    entity("Journalcode", "journalcode", QCRU),
    entity("PaymentMethod", "paymentmethod", QCRU),
    entity("TaxAgency", "taxagency", Capabilities::accounting(true, true, true, false, false)),
    entity("TaxCode", "taxcode", Capabilities::accounting(true, false, true, false, false)),
    entity("TaxRate", "taxrate", Capabilities::accounting(true, true, true, false, false)),
    entity("TaxService", "taxservice/taxcode", Capabilities::accounting(false, true, false, false, false)),
    entity("Term", "term", QCRU),
    entity("Vendor", "vendor", QCRU),
    // Supporting entities
    entity("Attachable", "attachable", Capabilities::CRUD),
    entity("CompanyInfo", "companyinfo", Capabilities::accounting(true, false, true, true, false)),
    entity("ExchangeRate", "exchangerate", Capabilities::accounting(true, false, false, true, false)),
    entity("Preferences", "preferences", Capabilities::accounting(true, false, true, true, false)),
    // Reports
    report("AccountListDetailReport", "AccountList"),
    report("APAgingDetailReport", "AgedPayableDetail"),
    report("APAgingSummaryReport", "AgedPayables"),
    report("ARAgingDetailReport", "AgedReceivableDetail"),
    report("ARAgingSummaryReport", "AgedReceivables"),
    report("BalanceSheetReport", "BalanceSheet"),
    report("CashFlowReport", "CashFlow"),
    report("CustomerBalanceReport", "CustomerBalance"),
    report("CustomerBalanceDetailReport", "CustomerBalanceDetail"),
    report("CustomerIncomeReport", "CustomerIncome"),
    report("GeneralLedgerReport", "GeneralLedger"),
    report("GeneralLedgerReportFR", "GeneralLedgerFR"),
    report("InventoryValuationSummaryReport", "InventoryValuationSummary"),
    report("JournalReport", "JournalReport"),
    report("ProfitAndLossReport", "ProfitAndLoss"),
    report("ProfitAndLossDetailReport", "ProfitAndLossDetail"),
    report("SalesByClassSummaryReport", "ClassSales"),
    report("SalesByCustomerReport", "CustomerSales"),
    report("SalesByDepartmentReport", "DepartmentSales"),
    report("SalesByProductReport", "ItemSales"),
    report("TaxSummaryReport", "TaxSummary"),
    report("TransactionListReport", "TransactionList"),
    report("TrialBalanceReportFR", "TrialBalanceFR"),
    report("TrialBalanceReport", "TrialBalance"),
    report("VendorBalanceReport", "VendorBalance"),
    report("VendorBalanceDetailReport", "VendorBalanceDetail"),
    report("VendorExpensesReport", "VendorExpenses"),
];

/// Lower-cased handle to entry.
static HANDLE_INDEX: OnceLock<HashMap<String, &'static RegistryEntry>> = OnceLock::new();

fn build_handle_index() -> HashMap<String, &'static RegistryEntry> {
    ENTRIES
        .iter()
        .map(|entry| (entry.handle.to_ascii_lowercase(), entry))
        .collect()
}

// ============================================================================
// Entity Registry
// ============================================================================

/// Read-only access to the entity catalog.
pub struct EntityRegistry;

impl EntityRegistry {
    /// Returns all entries in table order.
    pub fn all() -> &'static [RegistryEntry] {
        ENTRIES
    }

    /// Gets an entry by exact handle.
    pub fn get(handle: &str) -> Option<&'static RegistryEntry> {
        Self::all().iter().find(|e| e.handle == handle)
    }

    /// Looks up an entry by handle, ignoring ASCII case.
    pub fn find(handle: &str) -> Option<&'static RegistryEntry> {
        HANDLE_INDEX
            .get_or_init(build_handle_index)
            .get(&handle.to_ascii_lowercase())
            .copied()
    }

    /// Returns the accounting entries.
    pub fn accounting() -> Vec<&'static RegistryEntry> {
        Self::all().iter().filter(|e| !e.is_report()).collect()
    }

    /// Returns the report entries.
    pub fn reports() -> Vec<&'static RegistryEntry> {
        Self::all().iter().filter(|e| e.is_report()).collect()
    }

    /// Returns the number of entries.
    pub fn count() -> usize {
        Self::all().len()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_counts() {
        assert_eq!(EntityRegistry::count(), 62);
        assert_eq!(EntityRegistry::accounting().len(), 35);
        assert_eq!(EntityRegistry::reports().len(), 27);
    }

    #[test]
    fn test_handles_unique() {
        let handles: HashSet<&str> = EntityRegistry::all().iter().map(|e| e.handle).collect();
        assert_eq!(handles.len(), EntityRegistry::count());

        let lowered: HashSet<String> = EntityRegistry::all()
            .iter()
            .map(|e| e.handle.to_ascii_lowercase())
            .collect();
        assert_eq!(lowered.len(), EntityRegistry::count());
    }

    #[test]
    fn test_reports_are_report_only() {
        for entry in EntityRegistry::reports() {
            let caps = entry.capabilities;
            assert!(
                !(caps.create || caps.read || caps.update || caps.delete || caps.query),
                "{} mixes report and accounting capabilities",
                entry.handle
            );
            assert_eq!(entry.fragment, entry.name);
        }
    }

    #[test]
    fn test_known_capabilities() {
        let account = EntityRegistry::get("Account").unwrap();
        assert_eq!(account.capabilities.flags(), "CRU-Q-");

        let tax_service = EntityRegistry::get("TaxService").unwrap();
        assert_eq!(tax_service.fragment, "taxservice/taxcode");
        assert_eq!(tax_service.capabilities.flags(), "C-----");

        let exchange = EntityRegistry::get("ExchangeRate").unwrap();
        assert_eq!(exchange.capabilities.flags(), "--U-Q-");

        let pnl = EntityRegistry::get("ProfitAndLossReport").unwrap();
        assert_eq!(pnl.name, "ProfitAndLoss");
    }

    #[test]
    fn test_find_ignores_case() {
        assert_eq!(EntityRegistry::find("invoice").unwrap().handle, "Invoice");
        assert_eq!(EntityRegistry::find("PURCHASEORDER").unwrap().handle, "Purchaseorder");
        assert!(EntityRegistry::get("invoice").is_none());
        assert!(EntityRegistry::find("Widget").is_none());
    }
}
