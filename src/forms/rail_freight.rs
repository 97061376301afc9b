//! Rail freight quote forms.
//!
//! All text fields are trimmed. Weight-bracket rates default to "0".

use serde::{Deserialize, Serialize};

use super::{ensure_present, require, trimmed, FormMeta, FormRecord};
use crate::error::ApiError;

const DEFAULT_RATE: &str = "0";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RailFreightForm {
    #[serde(flatten)]
    pub meta: FormMeta,
    pub name: String,
    pub por: String,
    pub pol: String,
    pub shipping_lines: String,
    pub container_type: String,
    #[serde(rename = "weight20ft0_10")]
    pub weight_20ft_0_10: String,
    #[serde(rename = "weight20ft10_20")]
    pub weight_20ft_10_20: String,
    #[serde(rename = "weight20ft20_26")]
    pub weight_20ft_20_26: String,
    #[serde(rename = "weight20ft26Plus")]
    pub weight_20ft_26_plus: String,
    #[serde(rename = "weight40ft10_20")]
    pub weight_40ft_10_20: String,
    #[serde(rename = "weight40ft20Plus")]
    pub weight_40ft_20_plus: String,
    pub currency: String,
}

/// Create/edit body for rail freight forms.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RailFreightFormInput {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub por: Option<String>,
    #[serde(default)]
    pub pol: Option<String>,
    #[serde(default)]
    pub shipping_lines: Option<String>,
    #[serde(default)]
    pub container_type: Option<String>,
    #[serde(default, rename = "weight20ft0_10")]
    pub weight_20ft_0_10: Option<String>,
    #[serde(default, rename = "weight20ft10_20")]
    pub weight_20ft_10_20: Option<String>,
    #[serde(default, rename = "weight20ft20_26")]
    pub weight_20ft_20_26: Option<String>,
    #[serde(default, rename = "weight20ft26Plus")]
    pub weight_20ft_26_plus: Option<String>,
    #[serde(default, rename = "weight40ft10_20")]
    pub weight_40ft_10_20: Option<String>,
    #[serde(default, rename = "weight40ft20Plus")]
    pub weight_40ft_20_plus: Option<String>,
    #[serde(default)]
    pub currency: Option<String>,
}

impl RailFreightFormInput {
    fn trim(self) -> Self {
        Self {
            name: trimmed(self.name),
            por: trimmed(self.por),
            pol: trimmed(self.pol),
            shipping_lines: trimmed(self.shipping_lines),
            container_type: trimmed(self.container_type),
            weight_20ft_0_10: self.weight_20ft_0_10,
            weight_20ft_10_20: self.weight_20ft_10_20,
            weight_20ft_20_26: self.weight_20ft_20_26,
            weight_20ft_26_plus: self.weight_20ft_26_plus,
            weight_40ft_10_20: self.weight_40ft_10_20,
            weight_40ft_20_plus: self.weight_40ft_20_plus,
            currency: trimmed(self.currency),
        }
    }
}

fn rate(value: Option<String>) -> String {
    value.unwrap_or_else(|| DEFAULT_RATE.to_string())
}

impl FormRecord for RailFreightForm {
    type Input = RailFreightFormInput;

    const ALL_FORMS_KEY: &'static str = "rail_freight_all_forms";
    const OWNER_KEY_PREFIX: &'static str = "rail_freight_user_forms_";

    fn create(input: RailFreightFormInput, owner: &str) -> Result<Self, ApiError> {
        let input = input.trim();
        Ok(Self {
            meta: FormMeta::new(owner),
            name: require("name", input.name)?,
            por: require("por", input.por)?,
            pol: require("pol", input.pol)?,
            shipping_lines: require("shipping_lines", input.shipping_lines)?,
            container_type: require("container_type", input.container_type)?,
            weight_20ft_0_10: rate(input.weight_20ft_0_10),
            weight_20ft_10_20: rate(input.weight_20ft_10_20),
            weight_20ft_20_26: rate(input.weight_20ft_20_26),
            weight_20ft_26_plus: rate(input.weight_20ft_26_plus),
            weight_40ft_10_20: rate(input.weight_40ft_10_20),
            weight_40ft_20_plus: rate(input.weight_40ft_20_plus),
            currency: require("currency", input.currency)?,
        })
    }

    fn apply(&mut self, input: RailFreightFormInput) -> Result<(), ApiError> {
        let input = input.trim();
        let mut updated = self.clone();

        let text_fields = [
            (&mut updated.name, input.name),
            (&mut updated.por, input.por),
            (&mut updated.pol, input.pol),
            (&mut updated.shipping_lines, input.shipping_lines),
            (&mut updated.container_type, input.container_type),
            (&mut updated.weight_20ft_0_10, input.weight_20ft_0_10),
            (&mut updated.weight_20ft_10_20, input.weight_20ft_10_20),
            (&mut updated.weight_20ft_20_26, input.weight_20ft_20_26),
            (&mut updated.weight_20ft_26_plus, input.weight_20ft_26_plus),
            (&mut updated.weight_40ft_10_20, input.weight_40ft_10_20),
            (&mut updated.weight_40ft_20_plus, input.weight_40ft_20_plus),
            (&mut updated.currency, input.currency),
        ];
        for (field, value) in text_fields {
            if let Some(value) = value {
                *field = value;
            }
        }

        ensure_present("name", &updated.name)?;
        ensure_present("por", &updated.por)?;
        ensure_present("pol", &updated.pol)?;
        ensure_present("shipping_lines", &updated.shipping_lines)?;
        ensure_present("container_type", &updated.container_type)?;
        ensure_present("currency", &updated.currency)?;

        updated.meta.touch();
        *self = updated;
        Ok(())
    }

    fn meta(&self) -> &FormMeta {
        &self.meta
    }
}
