use rust_decimal_macros::dec;

use super::xml_utils::{XmlResult, XmlWriter, format_amount};
use super::{
    CONDIZIONI_PAGAMENTO, DEFAULT_CODICE_DESTINATARIO, DEFAULT_DENOMINAZIONE, DEFAULT_UNITA_MISURA,
    DIVISA, FORMATO_TRASMISSIONE, MODALITA_PAGAMENTO, SupplierConfig, TIPO_DOCUMENTO, fpa_ns,
    progressivo_invio,
};
use crate::core::{Customer, FatturaError, Invoice, summarize_by_rate};

/// Render an invoice as a FatturaPA FPR12 document.
///
/// The output is deterministic: the same invoice and configuration always
/// produce byte-identical XML. Mandatory data is checked up front and a
/// partial document is never returned.
pub fn to_fatturapa_xml(invoice: &Invoice, config: &SupplierConfig) -> XmlResult {
    if invoice.number.trim().is_empty() {
        return Err(FatturaError::Xml("invoice number must not be empty".into()));
    }
    if invoice.items.is_empty() {
        return Err(FatturaError::Xml(
            "invoice must have at least one line item".into(),
        ));
    }

    let mut w = XmlWriter::new()?;

    w.start_element_with_attrs(
        "p:FatturaElettronica",
        &[
            ("versione", FORMATO_TRASMISSIONE),
            ("xmlns:ds", fpa_ns::DS),
            ("xmlns:p", fpa_ns::P),
            ("xmlns:xsi", fpa_ns::XSI),
        ],
    )?;

    write_header(&mut w, invoice, config)?;
    write_body(&mut w, invoice)?;

    w.end_element("p:FatturaElettronica")?;
    w.into_string()
}

fn write_header(w: &mut XmlWriter, invoice: &Invoice, config: &SupplierConfig) -> Result<(), FatturaError> {
    w.start_element("FatturaElettronicaHeader")?;

    // Transmission metadata
    w.start_element("DatiTrasmissione")?;
    w.start_element("IdTrasmittente")?;
    w.text_element("IdPaese", &config.country_code)?;
    w.text_element("IdCodice", &config.vat_number)?;
    w.end_element("IdTrasmittente")?;
    w.text_element("ProgressivoInvio", &progressivo_invio(&invoice.number))?;
    w.text_element("FormatoTrasmissione", FORMATO_TRASMISSIONE)?;
    w.text_element("CodiceDestinatario", DEFAULT_CODICE_DESTINATARIO)?;
    w.end_element("DatiTrasmissione")?;

    // Issuer: fixed registry data from configuration
    w.start_element("CedentePrestatore")?;
    w.start_element("DatiAnagrafici")?;
    w.start_element("IdFiscaleIVA")?;
    w.text_element("IdPaese", &config.country_code)?;
    w.text_element("IdCodice", &config.vat_number)?;
    w.end_element("IdFiscaleIVA")?;
    w.start_element("Anagrafica")?;
    w.text_element("Denominazione", &config.company_name)?;
    w.end_element("Anagrafica")?;
    w.text_element("RegimeFiscale", &config.fiscal_regime)?;
    w.end_element("DatiAnagrafici")?;
    w.start_element("Sede")?;
    w.text_element("Indirizzo", &config.address)?;
    w.text_element("CAP", &config.postal_code)?;
    w.text_element("Comune", &config.city)?;
    w.text_element("Provincia", &config.province)?;
    w.text_element("Nazione", &config.country)?;
    w.end_element("Sede")?;
    w.end_element("CedentePrestatore")?;

    // Recipient from the customer
    write_customer(w, invoice.customer.as_ref())?;

    w.end_element("FatturaElettronicaHeader")?;
    Ok(())
}

fn write_customer(w: &mut XmlWriter, customer: Option<&Customer>) -> Result<(), FatturaError> {
    w.start_element("CessionarioCommittente")?;
    w.start_element("DatiAnagrafici")?;

    if let Some(vat) = customer.and_then(|c| c.vat_number.as_deref()) {
        w.start_element("IdFiscaleIVA")?;
        w.text_element("IdPaese", "IT")?;
        w.text_element("IdCodice", vat)?;
        w.end_element("IdFiscaleIVA")?;
    }
    if let Some(tax_code) = customer.and_then(|c| c.tax_code.as_deref()) {
        w.text_element("CodiceFiscale", tax_code)?;
    }

    let name = customer
        .map(|c| c.name.as_str())
        .filter(|n| !n.trim().is_empty())
        .unwrap_or(DEFAULT_DENOMINAZIONE);
    w.start_element("Anagrafica")?;
    w.text_element("Denominazione", name)?;
    w.end_element("Anagrafica")?;
    w.end_element("DatiAnagrafici")?;

    w.start_element("Sede")?;
    w.text_element(
        "Indirizzo",
        customer.and_then(|c| c.address.as_deref()).unwrap_or(""),
    )?;
    w.text_element("CAP", "00000")?;
    w.text_element("Comune", "")?;
    w.text_element("Nazione", "IT")?;
    w.end_element("Sede")?;
    w.end_element("CessionarioCommittente")?;
    Ok(())
}

fn write_body(w: &mut XmlWriter, invoice: &Invoice) -> Result<(), FatturaError> {
    w.start_element("FatturaElettronicaBody")?;

    // General document data
    w.start_element("DatiGenerali")?;
    w.start_element("DatiGeneraliDocumento")?;
    w.text_element("TipoDocumento", TIPO_DOCUMENTO)?;
    w.text_element("Divisa", DIVISA)?;
    w.text_element("Data", &invoice.issue_date.to_string())?;
    w.text_element("Numero", &invoice.number)?;
    if let Some(notes) = invoice.notes.as_deref().filter(|n| !n.trim().is_empty()) {
        w.text_element("Causale", notes)?;
    }
    w.amount_element("ImportoTotaleDocumento", invoice.total)?;
    w.end_element("DatiGeneraliDocumento")?;
    w.end_element("DatiGenerali")?;

    // Lines and per-rate summary
    w.start_element("DatiBeniServizi")?;
    for (i, item) in invoice.items.iter().enumerate() {
        w.start_element("DettaglioLinee")?;
        w.text_element("NumeroLinea", &(i + 1).to_string())?;
        w.text_element("Descrizione", &item.description)?;
        w.text_element("Quantita", &format_amount(item.quantity))?;
        w.text_element(
            "UnitaMisura",
            item.unit.as_deref().unwrap_or(DEFAULT_UNITA_MISURA),
        )?;
        w.amount_element("PrezzoUnitario", item.unit_price)?;
        w.amount_element("PrezzoTotale", item.subtotal())?;
        w.text_element("AliquotaIVA", &format_amount(item.tax_rate))?;
        w.end_element("DettaglioLinee")?;
    }

    for bucket in summarize_by_rate(&invoice.items) {
        w.start_element("DatiRiepilogo")?;
        w.text_element("AliquotaIVA", &format_amount(bucket.rate))?;
        w.amount_element("ImponibileImporto", bucket.taxable_base)?;
        w.amount_element("Imposta", bucket.tax_amount)?;
        w.text_element("EsigibilitaIVA", "I")?;
        w.end_element("DatiRiepilogo")?;
    }
    w.end_element("DatiBeniServizi")?;

    // Payment data: fixed terms/method, amount = document total
    w.start_element("DatiPagamento")?;
    w.text_element("CondizioniPagamento", CONDIZIONI_PAGAMENTO)?;
    w.start_element("DettaglioPagamento")?;
    w.text_element("ModalitaPagamento", MODALITA_PAGAMENTO)?;
    if let Some(due) = &invoice.due_date {
        w.text_element("DataScadenzaPagamento", &due.to_string())?;
    }
    w.amount_element("ImportoPagamento", invoice.total)?;
    w.end_element("DettaglioPagamento")?;
    w.end_element("DatiPagamento")?;

    w.end_element("FatturaElettronicaBody")?;
    Ok(())
}
