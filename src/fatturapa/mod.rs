//! FatturaPA XML generation (FPR12, private-counterparty variant).
//!
//! Renders one [`Invoice`](crate::core::Invoice) with its customer and line
//! items into the fixed schema of the Agenzia delle Entrate exchange system
//! (Sistema di Interscambio).
//!
//! # Example
//!
//! ```no_run
//! use fattura::core::Invoice;
//! use fattura::fatturapa::{self, SupplierConfig};
//!
//! let invoice: Invoice = todo!(); // build via InvoiceBuilder
//! let xml = fatturapa::to_fatturapa_xml(&invoice, &SupplierConfig::default()).unwrap();
//! ```

mod xml;
pub(crate) mod xml_utils;

pub use xml::to_fatturapa_xml;

/// FatturaPA transmission format for invoices to private parties (B2B/B2C).
pub const FORMATO_TRASMISSIONE: &str = "FPR12";

/// Document type: TD01, ordinary invoice.
pub const TIPO_DOCUMENTO: &str = "TD01";

/// Invoice currency (single-currency system).
pub const DIVISA: &str = "EUR";

/// Recipient code used when the customer has no SdI channel of their own.
pub const DEFAULT_CODICE_DESTINATARIO: &str = "0000000";

/// Unit of measure written when a line has none.
pub const DEFAULT_UNITA_MISURA: &str = "pz";

/// Denomination written when the customer (or their name) is absent.
pub const DEFAULT_DENOMINAZIONE: &str = "Cliente";

/// Payment terms: TP02, complete payment in a single instalment.
pub const CONDIZIONI_PAGAMENTO: &str = "TP02";

/// Payment method: MP05, bank transfer.
pub const MODALITA_PAGAMENTO: &str = "MP05";

/// FatturaPA v1.2 namespace URIs.
pub mod fpa_ns {
    pub const P: &str = "http://ivaservizi.agenziaentrate.gov.it/docs/xsd/fatture/v1.2";
    pub const DS: &str = "http://www.w3.org/2000/09/xmldsig#";
    pub const XSI: &str = "http://www.w3.org/2001/XMLSchema-instance";
}

/// Fixed registry data of the issuing party (CedentePrestatore).
///
/// This is injected configuration, never derived from any stored entity.
#[derive(Debug, Clone)]
pub struct SupplierConfig {
    /// ISO 3166-1 alpha-2 country of the VAT registration.
    pub country_code: String,
    /// Partita IVA without the country prefix.
    pub vat_number: String,
    pub company_name: String,
    /// RegimeFiscale code (RF01 = ordinary regime).
    pub fiscal_regime: String,
    pub address: String,
    pub postal_code: String,
    pub city: String,
    pub province: String,
    pub country: String,
}

impl Default for SupplierConfig {
    fn default() -> Self {
        Self {
            country_code: "IT".into(),
            vat_number: "12345678901".into(),
            company_name: "La Mia Azienda SRL".into(),
            fiscal_regime: "RF01".into(),
            address: "Via Roma 1".into(),
            postal_code: "00100".into(),
            city: "Roma".into(),
            province: "RM".into(),
            country: "IT".into(),
        }
    }
}

/// Transmission sequence number: the digits of the invoice number, last 10
/// kept (the SdI field is capped at 10 characters). "0" when the number
/// carries no digits. Never derived from wall-clock time, so serialization
/// stays deterministic.
pub fn progressivo_invio(invoice_number: &str) -> String {
    let digits: String = invoice_number.chars().filter(char::is_ascii_digit).collect();
    if digits.is_empty() {
        return "0".into();
    }
    let start = digits.len().saturating_sub(10);
    digits[start..].to_string()
}

/// Export file name: `IT<vat-or-placeholder>_<digits-of-number>.xml`.
pub fn xml_file_name(invoice_number: &str, config: &SupplierConfig) -> String {
    let vat = if config.vat_number.trim().is_empty() {
        "00000000000"
    } else {
        config.vat_number.as_str()
    };
    format!("IT{}_{}.xml", vat, progressivo_invio(invoice_number))
}

/// PDF artifact name used by the external renderer: `fattura-<number>.pdf`.
pub fn pdf_file_name(invoice_number: &str) -> String {
    format!("fattura-{invoice_number}.pdf")
}
