use std::path::{Path, PathBuf};

use anyhow::Context;

use crate::entity::master_data::Kind;

pub(crate) struct Config {
    path: Option<PathBuf>,
}

impl Config {
    pub(crate) fn from_env() -> anyhow::Result<Self> {
        Ok(Self {
            path: std::env::var("DATASET_PATH").ok().map(PathBuf::from),
        })
    }

    pub(crate) async fn synchronize(
        &self,
        database: &crate::service::database::Pool,
    ) -> anyhow::Result<()> {
        if let Some(ref path) = self.path {
            tracing::debug!("synchronizing with provided dataset");
            let root = RootConfig::from_path(path)?;
            root.synchronize(database).await
        } else {
            tracing::debug!("no dataset path provided, skipping...");
            Ok(())
        }
    }
}

#[derive(Debug, serde::Deserialize)]
pub(crate) struct ItemConfig {
    code: String,
    label_en: String,
    #[serde(default)]
    label_kn: Option<String>,
    #[serde(default)]
    sort_order: i64,
    #[serde(default = "ItemConfig::default_active")]
    active: bool,
}

impl ItemConfig {
    fn default_active() -> bool {
        true
    }
}

#[derive(Debug, serde::Deserialize)]
pub(crate) struct RadiusConfig {
    kilometers: i64,
    #[serde(flatten)]
    item: ItemConfig,
}

#[derive(Debug, Default, serde::Deserialize)]
pub(crate) struct RootConfig {
    #[serde(default)]
    languages: Vec<ItemConfig>,
    #[serde(default)]
    categories: Vec<ItemConfig>,
    #[serde(default)]
    terms: Vec<ItemConfig>,
    #[serde(default)]
    service_radius: Vec<RadiusConfig>,
}

impl RootConfig {
    fn from_path<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let file = std::fs::OpenOptions::new()
            .read(true)
            .open(path)
            .context("opening dataset file")?;
        serde_json::from_reader(file).context("reading dataset file")
    }

    pub(crate) async fn synchronize(
        &self,
        database: &crate::service::database::Pool,
    ) -> anyhow::Result<()> {
        tracing::debug!("executing synchro");
        let mut tx = database.as_ref().begin().await?;
        for (kind, items) in [
            (Kind::Language, &self.languages),
            (Kind::Category, &self.categories),
            (Kind::Term, &self.terms),
        ] {
            for item in items.iter() {
                crate::entity::master_data::Upsert::new(
                    kind,
                    &item.code,
                    &item.label_en,
                    item.label_kn.as_deref(),
                    item.sort_order,
                    item.active,
                )
                .execute(&mut *tx)
                .await
                .with_context(|| format!("upserting {kind:?} {:?}", item.code))?;
            }
        }
        for radius in self.service_radius.iter() {
            crate::entity::service_radius::Upsert {
                code: &radius.item.code,
                kilometers: radius.kilometers,
                label_en: &radius.item.label_en,
                label_kn: radius.item.label_kn.as_deref(),
                sort_order: radius.item.sort_order,
                active: radius.item.active,
            }
            .execute(&mut *tx)
            .await
            .with_context(|| format!("upserting service radius {:?}", radius.item.code))?;
        }
        tx.commit().await?;
        Ok(())
    }
}

#[cfg(test)]
impl ItemConfig {
    fn test(code: &str, label_en: &str, label_kn: Option<&str>, sort_order: i64) -> Self {
        Self {
            code: code.into(),
            label_en: label_en.into(),
            label_kn: label_kn.map(String::from),
            sort_order,
            active: true,
        }
    }
}

#[cfg(test)]
impl RootConfig {
    pub(crate) fn test() -> Self {
        Self {
            languages: vec![
                ItemConfig::test("kn", "Kannada", Some("ಕನ್ನಡ"), 0),
                ItemConfig::test("en", "English", Some("ಇಂಗ್ಲಿಷ್"), 1),
                ItemConfig::test("sa", "Sanskrit", None, 2),
            ],
            categories: vec![
                ItemConfig::test("purohit", "Purohit", Some("ಪುರೋಹಿತ"), 0),
                ItemConfig::test("cook", "Cook", Some("ಅಡುಗೆಯವರು"), 1),
            ],
            terms: vec![
                ItemConfig::test("privacy", "Privacy policy", None, 0),
                ItemConfig {
                    active: false,
                    ..ItemConfig::test("legacy", "Legacy terms", None, 1)
                },
            ],
            service_radius: vec![
                RadiusConfig {
                    kilometers: 25,
                    item: ItemConfig::test("25km", "Within 25 km", Some("25 ಕಿ.ಮೀ ಒಳಗೆ"), 2),
                },
                RadiusConfig {
                    kilometers: 5,
                    item: ItemConfig::test("5km", "Within 5 km", Some("5 ಕಿ.ಮೀ ಒಳಗೆ"), 0),
                },
                RadiusConfig {
                    kilometers: 10,
                    item: ItemConfig::test("10km", "Within 10 km", None, 1),
                },
            ],
        }
    }
}
