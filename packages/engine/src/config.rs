//! Configuration for the reconciliation engine
//!
//! The engine has a single corpus-dependent table: placeholder texts for
//! derogated chapters whose articles the statute normalizer could not
//! enumerate. It is swappable per corpus and loadable from the `reconcile`
//! section of the same YAML corpus file the parser reads.

use std::path::Path;

use cotejo_shared::numbering::same_division;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};

/// Article number used in the output for articles whose source number is empty.
pub const UNNUMBERED_ARTICLE: &str = "S/N";

/// `accion` recorded on articles derogated through their chapter.
pub const CHAPTER_DEROGATION_ACTION: &str = "derógase (capítulo completo)";

/// `accion` recorded on articles derogated with the whole law.
pub const WHOLE_LAW_DEROGATION_ACTION: &str = "derógase (ley completa)";

/// Placeholder articles for one derogated chapter that has no enumerable
/// articles in the law tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChapterFallback {
    /// Chapter number (`"VIII"`).
    pub chapter: String,
    /// Título that holds the chapter (`"III"`).
    pub title: String,
    /// Título name, used when the title itself has to be created.
    #[serde(default)]
    pub title_name: String,
    /// Chapter name used for the placeholder chapter.
    #[serde(default)]
    pub chapter_name: String,
    /// Article texts in ordinal order; one synthetic article per entry.
    pub texts: Vec<String>,
}

impl ChapterFallback {
    /// Whether this fallback covers `chapter` in `title`. A derogation that
    /// does not name its Título matches on the chapter alone.
    pub fn covers(&self, chapter: &str, title: Option<&str>) -> bool {
        same_division(&self.chapter, chapter) && title.is_none_or(|t| same_division(&self.title, t))
    }

    /// Identifier of the `ordinal`-th synthetic article (1-based).
    pub fn article_id(&self, ordinal: usize) -> String {
        format!("CAP_{}_ART_{ordinal}", self.chapter.trim().to_uppercase())
    }
}

/// Corpus-specific tables used by the reconciliation engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconcileConfig {
    pub chapter_fallbacks: Vec<ChapterFallback>,
}

impl Default for ReconcileConfig {
    fn default() -> Self {
        Self::argentine_labour_reform()
    }
}

/// On-disk corpus file; the engine only reads the `reconcile` section.
#[derive(Debug, Default, Deserialize)]
struct CorpusFile {
    #[serde(default)]
    reconcile: ReconcileConfig,
}

impl ReconcileConfig {
    /// No fallbacks: every empty derogated chapter is reported.
    pub fn empty() -> Self {
        Self {
            chapter_fallbacks: Vec::new(),
        }
    }

    /// Ley de Contrato de Trabajo: Capítulo VIII of Título III (formación
    /// profesional) is published without article numbers.
    pub fn argentine_labour_reform() -> Self {
        let texts = [
            "La promoción profesional y la formación en el trabajo, en condiciones igualitarias de acceso y trato será un derecho fundamental para todos los trabajadores y trabajadoras.",
            "El empleador implementará acciones de formación profesional profesional y/o capacitación con la participación de los trabajadores y con la asistencia de los organismos competentes al Estado.",
            "La capacitación del trabajador se efectuará de acuerdo a los requerimientos del empleador, a las características de las tareas, a las exigencias de la organización del trabajo y a los medios que le provea el empleador para dicha capacitación.",
            "La organización sindical que represente a los trabajadores de conformidad a la legislación vigente tendrá derecho a recibir información sobre la evolución de la empresa, sobre innovaciones tecnológicas y organizativas y toda otra que tenga relación con la planificación de acciones de formación y capacitación profesional.",
            "La organización sindical que represente a los trabajadores de conformidad a la legislación vigente ante innovaciones de base tecnológica y organizativa de la empresa, podrá solicitar al empleador la implementación de acciones de formación profesional para la mejor adecuación del personal al nuevo sistema.",
            "En el certificado de trabajo que el empleador está obligado a entregar a la extinción del contrato de trabajo deberá constar además de lo prescripto en el artículo 80, la calificación profesional obtenida en el o los puestos de trabajo desempeñados, hubiere o no realizado el trabajador acciones regulares de capacitación.",
            "El trabajador tendrá derecho a una cantidad de horas del tiempo total anual del trabajo, de acuerdo a lo que se establezca en el convenio colectivo, para realizar, fuera de su lugar de trabajo actividades de formación y/o capacitación que él juzgue de su propio interés.",
        ];
        Self {
            chapter_fallbacks: vec![ChapterFallback {
                chapter: "VIII".to_string(),
                title: "III".to_string(),
                title_name: "De los derechos y obligaciones de las partes".to_string(),
                chapter_name: "DE LA FORMACIÓN PROFESIONAL".to_string(),
                texts: texts.into_iter().map(String::from).collect(),
            }],
        }
    }

    /// Fallback for a derogated chapter, if one is configured.
    pub fn fallback_for(&self, chapter: &str, title: Option<&str>) -> Option<&ChapterFallback> {
        self.chapter_fallbacks.iter().find(|f| f.covers(chapter, title))
    }

    /// Parse the `reconcile` section of a YAML corpus file.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let file: CorpusFile = serde_yaml_ng::from_str(yaml)?;
        Ok(file.reconcile)
    }

    pub fn load(path: &Path) -> Result<Self> {
        match path.extension().and_then(|e| e.to_str()) {
            Some("yaml" | "yml") => Self::from_yaml_str(&std::fs::read_to_string(path)?),
            _ => Err(EngineError::UnsupportedFormat(path.display().to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_has_chapter_viii_fallback() {
        let config = ReconcileConfig::default();
        let fallback = config.fallback_for("VIII", Some("III")).unwrap();
        assert_eq!(fallback.texts.len(), 7);
        assert_eq!(fallback.article_id(1), "CAP_VIII_ART_1");
    }

    #[test]
    fn test_fallback_matching() {
        let config = ReconcileConfig::default();
        assert!(config.fallback_for("viii", None).is_some());
        assert!(config.fallback_for("8", Some("3")).is_some());
        assert!(config.fallback_for("VIII", Some("II")).is_none());
        assert!(config.fallback_for("VII", None).is_none());
        assert!(ReconcileConfig::empty().fallback_for("VIII", None).is_none());
    }

    #[test]
    fn test_yaml_section() {
        let yaml = r#"
resolver:
  title_laws:
    I: "20744"
reconcile:
  chapter_fallbacks:
    - chapter: "II"
      title: "IV"
      texts: ["Uno.", "Dos."]
"#;
        let config = ReconcileConfig::from_yaml_str(yaml).unwrap();
        assert_eq!(config.chapter_fallbacks.len(), 1);
        assert_eq!(config.chapter_fallbacks[0].texts, vec!["Uno.", "Dos."]);
        assert_eq!(config.chapter_fallbacks[0].chapter_name, "");
    }

    #[test]
    fn test_missing_section_keeps_default() {
        let config = ReconcileConfig::from_yaml_str("resolver: {}\n").unwrap();
        assert_eq!(config, ReconcileConfig::default());
    }

    #[test]
    fn test_load_rejects_other_extensions() {
        let err = ReconcileConfig::load(Path::new("corpus.toml")).unwrap_err();
        assert!(matches!(err, EngineError::UnsupportedFormat(_)));
    }

    #[test]
    fn test_shipped_corpus_matches_default() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../config/reforma_laboral.yaml");
        assert_eq!(ReconcileConfig::load(&path).unwrap(), ReconcileConfig::default());
    }
}
