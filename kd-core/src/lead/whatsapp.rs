//! Pre-filled WhatsApp chat links for sending a calculation to the office.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use url::{Url, form_urlencoded};

/// Office number in international format, without `+`.
pub const OFFICE_NUMBER: &str = "905322361017";

const WA_ME: &str = "https://wa.me/";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WhatsAppMessage {
    #[serde(rename = "ilce")]
    pub district: String,
    #[serde(rename = "mahalle")]
    pub neighborhood: String,
    /// Free text such as "arsa" or "bina".
    #[serde(rename = "arsaTipi")]
    pub property_kind: String,
    #[serde(rename = "arsaM2", default, skip_serializing_if = "Option::is_none")]
    pub land_area: Option<Decimal>,
    #[serde(rename = "emsal", default, skip_serializing_if = "Option::is_none")]
    pub floor_area_ratio: Option<Decimal>,
    /// Calculator summary line.
    #[serde(rename = "sonucOzet")]
    pub summary: String,
    #[serde(rename = "telefon")]
    pub phone: String,
}

impl WhatsAppMessage {
    /// Message body. Land area and ratio lines are left out when absent or
    /// zero.
    pub fn render(&self) -> String {
        let mut message = String::from("Merhaba KD Ankara,\n\n");
        message.push_str(&format!(
            "{} {}'de {} için bilgi almak istiyorum.\n\n",
            self.district, self.neighborhood, self.property_kind
        ));

        if let Some(area) = self.land_area.filter(|v| !v.is_zero()) {
            message.push_str(&format!("📐 Arsa: {} m²\n", area.normalize()));
        }
        if let Some(ratio) = self.floor_area_ratio.filter(|v| !v.is_zero()) {
            message.push_str(&format!("📊 Emsal: {}\n", ratio.normalize()));
        }

        message.push_str(&format!("\n✨ Hesaplama Sonucu:\n{}\n\n", self.summary));
        message.push_str(&format!("📞 İletişim: {}\n\n", self.phone));
        message.push_str("Detaylı bilgi ve fizibilite raporu için görüşmek isterim.");
        message
    }

    /// `https://wa.me/<number>?text=<message>` for the office number.
    pub fn link(&self) -> Result<Url, url::ParseError> {
        self.link_to(OFFICE_NUMBER)
    }

    /// Spaces in the text are sent as `%20`; WhatsApp shows `+` literally.
    pub fn link_to(
        &self,
        number: &str,
    ) -> Result<Url, url::ParseError> {
        let mut url = Url::parse(WA_ME)?.join(number)?;
        let text: String = form_urlencoded::byte_serialize(self.render().as_bytes()).collect();
        url.set_query(Some(&format!("text={}", text.replace('+', "%20"))));
        Ok(url)
    }
}
