//! Builds collaborator adapters from configuration.

use moodskin_core::cache::KeyValueCache;
use moodskin_core::config::{
    IdentityProviderKind, IdentitySettings, InferenceSettings, RemoteProviderKind, RemoteSettings,
    SecretConfig, TextProvider,
};
use moodskin_core::error::{MoodskinError, Result};
use moodskin_core::identity::IdentityProvider;
use moodskin_core::inference::{FacialMoodInference, TextMoodInference};
use moodskin_core::record::UserRecordStore;
use moodskin_infrastructure::{FileUserRecordStore, LocalIdentityProvider, MoodskinPaths};
use std::sync::Arc;

use crate::facial_client::RestFacialClient;
use crate::gemini_client::GeminiTextClient;
use crate::huggingface_client::HuggingFaceTextClient;
use crate::rest_identity::RestIdentityProvider;
use crate::rest_record_store::RestUserRecordStore;

pub fn text_inference(
    settings: &InferenceSettings,
    secrets: &SecretConfig,
) -> Arc<dyn TextMoodInference> {
    match settings.text_provider {
        TextProvider::Huggingface => {
            let api_key = secrets.huggingface.as_ref().map(|c| c.api_key.clone());
            Arc::new(HuggingFaceTextClient::new(
                settings.huggingface_model_url.clone(),
                api_key,
            ))
        }
        TextProvider::Gemini => {
            let config = secrets.gemini.as_ref();
            let model = config
                .and_then(|c| c.model_name.clone())
                .unwrap_or_else(|| settings.gemini_model.clone());
            Arc::new(GeminiTextClient::new(
                config.map(|c| c.api_key.clone()),
                model,
            ))
        }
    }
}

/// The facial client reuses the `remote` key when the endpoint needs one.
pub fn facial_inference(
    settings: &InferenceSettings,
    secrets: &SecretConfig,
) -> Arc<dyn FacialMoodInference> {
    Arc::new(RestFacialClient::new(
        settings.facial_endpoint.clone(),
        secrets.remote.as_ref().map(|c| c.api_key.clone()),
    ))
}

pub fn identity_provider(
    settings: &IdentitySettings,
    secrets: &SecretConfig,
    cache: Arc<dyn KeyValueCache>,
) -> Result<Arc<dyn IdentityProvider>> {
    match settings.provider {
        IdentityProviderKind::Local => Ok(Arc::new(LocalIdentityProvider::new(cache))),
        IdentityProviderKind::Rest => {
            let base_url = settings.base_url.clone().ok_or_else(|| {
                MoodskinError::config("[identity] provider = \"rest\" needs base_url")
            })?;
            Ok(Arc::new(RestIdentityProvider::new(
                base_url,
                secrets.identity.as_ref().map(|c| c.api_key.clone()),
                cache,
            )))
        }
    }
}

/// `None` when mirroring is disabled.
pub fn record_store(
    settings: &RemoteSettings,
    secrets: &SecretConfig,
    paths: &MoodskinPaths,
) -> Result<Option<Arc<dyn UserRecordStore>>> {
    match settings.provider {
        RemoteProviderKind::None => Ok(None),
        RemoteProviderKind::File => {
            let dir = settings
                .records_dir
                .clone()
                .unwrap_or_else(|| paths.records_dir());
            Ok(Some(Arc::new(FileUserRecordStore::new(dir))))
        }
        RemoteProviderKind::Rest => {
            let base_url = settings.base_url.clone().ok_or_else(|| {
                MoodskinError::config("[remote] provider = \"rest\" needs base_url")
            })?;
            Ok(Some(Arc::new(RestUserRecordStore::new(
                base_url,
                secrets.remote.as_ref().map(|c| c.api_key.clone()),
            ))))
        }
    }
}
