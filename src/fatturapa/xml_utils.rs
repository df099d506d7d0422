use quick_xml::Writer;
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use rust_decimal::Decimal;
use std::io::Cursor;

use crate::core::FatturaError;
use crate::core::money::round2;

pub type XmlResult = Result<String, FatturaError>;

fn xml_io(e: std::io::Error) -> FatturaError {
    FatturaError::Xml(format!("XML write error: {e}"))
}

/// Thin event-based writer. Text content is escaped on write, so the five
/// predefined entities in user-supplied text come out escaped exactly once.
pub struct XmlWriter {
    writer: Writer<Cursor<Vec<u8>>>,
}

impl XmlWriter {
    pub fn new() -> Result<Self, FatturaError> {
        let mut writer = Writer::new_with_indent(Cursor::new(Vec::new()), b' ', 2);
        writer
            .write_event(Event::Decl(quick_xml::events::BytesDecl::new(
                "1.0",
                Some("UTF-8"),
                None,
            )))
            .map_err(xml_io)?;
        Ok(Self { writer })
    }

    pub fn into_string(self) -> Result<String, FatturaError> {
        let buf = self.writer.into_inner().into_inner();
        String::from_utf8(buf).map_err(|e| FatturaError::Xml(format!("XML UTF-8 error: {e}")))
    }

    pub fn start_element(&mut self, name: &str) -> Result<&mut Self, FatturaError> {
        self.writer
            .write_event(Event::Start(BytesStart::new(name)))
            .map_err(xml_io)?;
        Ok(self)
    }

    pub fn start_element_with_attrs(
        &mut self,
        name: &str,
        attrs: &[(&str, &str)],
    ) -> Result<&mut Self, FatturaError> {
        let mut elem = BytesStart::new(name);
        for (k, v) in attrs {
            elem.push_attribute((*k, *v));
        }
        self.writer
            .write_event(Event::Start(elem))
            .map_err(xml_io)?;
        Ok(self)
    }

    pub fn end_element(&mut self, name: &str) -> Result<&mut Self, FatturaError> {
        self.writer
            .write_event(Event::End(BytesEnd::new(name)))
            .map_err(xml_io)?;
        Ok(self)
    }

    pub fn text_element(&mut self, name: &str, text: &str) -> Result<&mut Self, FatturaError> {
        self.start_element(name)?;
        self.writer
            .write_event(Event::Text(BytesText::new(text)))
            .map_err(xml_io)?;
        self.end_element(name)
    }

    /// Write a monetary/quantity element with fixed 2-decimal formatting.
    pub fn amount_element(&mut self, name: &str, amount: Decimal) -> Result<&mut Self, FatturaError> {
        self.text_element(name, &format_amount(amount))
    }
}

/// Format a Decimal for FatturaPA output: always exactly 2 decimal places,
/// period separator, locale-independent. Rounds half away from zero first.
pub fn format_amount(d: Decimal) -> String {
    let rounded = round2(d);
    // Rescale so Display always prints two fractional digits.
    let mut fixed = rounded;
    fixed.rescale(2);
    fixed.to_string()
}
