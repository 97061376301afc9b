//! Origin charge quote forms.

use serde::{Deserialize, Serialize};

use super::{ensure_present, require, FormMeta, FormRecord};
use crate::error::ApiError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OriginForm {
    #[serde(flatten)]
    pub meta: FormMeta,
    pub name: Option<String>,
    pub por: String,
    pub pol: String,
    pub pod: Option<String>,
    pub shipping_lines: String,
    pub container_type: String,
    pub bl_fees: Option<String>,
    pub thc: Option<String>,
    pub muc: Option<String>,
    pub toll: Option<String>,
    pub currency: Option<String>,
}

/// Create/edit body for origin forms.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OriginFormInput {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub por: Option<String>,
    #[serde(default)]
    pub pol: Option<String>,
    #[serde(default)]
    pub pod: Option<String>,
    #[serde(default)]
    pub shipping_lines: Option<String>,
    #[serde(default)]
    pub container_type: Option<String>,
    #[serde(default)]
    pub bl_fees: Option<String>,
    #[serde(default)]
    pub thc: Option<String>,
    #[serde(default)]
    pub muc: Option<String>,
    #[serde(default)]
    pub toll: Option<String>,
    #[serde(default)]
    pub currency: Option<String>,
}

impl FormRecord for OriginForm {
    type Input = OriginFormInput;

    const ALL_FORMS_KEY: &'static str = "all_forms";
    const OWNER_KEY_PREFIX: &'static str = "user_forms_";

    fn create(input: OriginFormInput, owner: &str) -> Result<Self, ApiError> {
        Ok(Self {
            meta: FormMeta::new(owner),
            name: input.name,
            por: require("por", input.por)?,
            pol: require("pol", input.pol)?,
            pod: input.pod,
            shipping_lines: require("shipping_lines", input.shipping_lines)?,
            container_type: require("container_type", input.container_type)?,
            bl_fees: input.bl_fees,
            thc: input.thc,
            muc: input.muc,
            toll: input.toll,
            currency: input.currency,
        })
    }

    fn apply(&mut self, input: OriginFormInput) -> Result<(), ApiError> {
        let mut updated = self.clone();

        if input.name.is_some() {
            updated.name = input.name;
        }
        if let Some(por) = input.por {
            updated.por = por;
        }
        if let Some(pol) = input.pol {
            updated.pol = pol;
        }
        if input.pod.is_some() {
            updated.pod = input.pod;
        }
        if let Some(shipping_lines) = input.shipping_lines {
            updated.shipping_lines = shipping_lines;
        }
        if let Some(container_type) = input.container_type {
            updated.container_type = container_type;
        }
        if input.bl_fees.is_some() {
            updated.bl_fees = input.bl_fees;
        }
        if input.thc.is_some() {
            updated.thc = input.thc;
        }
        if input.muc.is_some() {
            updated.muc = input.muc;
        }
        if input.toll.is_some() {
            updated.toll = input.toll;
        }
        if input.currency.is_some() {
            updated.currency = input.currency;
        }

        ensure_present("por", &updated.por)?;
        ensure_present("pol", &updated.pol)?;
        ensure_present("shipping_lines", &updated.shipping_lines)?;
        ensure_present("container_type", &updated.container_type)?;

        updated.meta.touch();
        *self = updated;
        Ok(())
    }

    fn meta(&self) -> &FormMeta {
        &self.meta
    }
}
