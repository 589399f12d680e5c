//! Query classification and tool detection.
//!
//! Both are keyword heuristics: case-insensitive substring matches against
//! fixed (Portuguese) keyword sets. The [`Classifier`] trait lets a
//! statistical or model-based classifier replace [`KeywordClassifier`]
//! without touching the router.

use parley_core::{Category, ToolKind, ToolRequest};

/// Maps a raw user query to a [`Category`]. Pure; never fails.
pub trait Classifier: Send + Sync {
    fn classify(&self, query: &str) -> Category;
}

const COMPLEX_KEYWORDS: &[&str] = &[
    "calcule",
    "resolva",
    "equação",
    "matemática",
    "derivada",
    "integral",
    "função",
    "matriz",
    "teorema",
    "prova",
    "demonstre",
    "otimize",
    "debug",
    "código",
    "programa",
    "algoritmo",
    "implementação",
];

const ANALYTICAL_KEYWORDS: &[&str] = &[
    "analise",
    "compare",
    "avalie",
    "discuta",
    "explique",
    "interprete",
    "examine",
    "investigue",
    "por que",
    "qual a diferença",
    "como funciona",
    "qual o motivo",
];

const CREATIVE_KEYWORDS: &[&str] = &[
    "crie",
    "invente",
    "imagine",
    "desenvolva",
    "escreva uma história",
    "componha",
    "desenhe",
    "projete",
    "sugira",
    "ideias",
    "brainstorm",
    "design",
    "arte",
    "criativo",
    "inovador",
    "original",
];

/// Keyword-set classifier.
///
/// Sets are checked in priority order complex → analytical → creative; the
/// first set with a match wins, no match means [`Category::Simple`].
#[derive(Debug, Clone)]
pub struct KeywordClassifier {
    /// (category, lowercase keywords), in priority order
    sets: Vec<(Category, Vec<String>)>,
}

impl Default for KeywordClassifier {
    fn default() -> Self {
        Self::new(vec![
            (Category::Complex, owned(COMPLEX_KEYWORDS)),
            (Category::Analytical, owned(ANALYTICAL_KEYWORDS)),
            (Category::Creative, owned(CREATIVE_KEYWORDS)),
        ])
    }
}

impl KeywordClassifier {
    /// Build from custom keyword sets, checked in the given order.
    pub fn new(sets: Vec<(Category, Vec<String>)>) -> Self {
        let sets = sets
            .into_iter()
            .map(|(cat, words)| (cat, words.into_iter().map(|w| w.to_lowercase()).collect()))
            .collect();
        Self { sets }
    }
}

impl Classifier for KeywordClassifier {
    fn classify(&self, query: &str) -> Category {
        let query = query.to_lowercase();
        self.sets
            .iter()
            .find(|(_, words)| words.iter().any(|w| query.contains(w.as_str())))
            .map(|(cat, _)| *cat)
            .unwrap_or(Category::Simple)
    }
}

fn owned(words: &[&str]) -> Vec<String> {
    words.iter().map(|w| w.to_string()).collect()
}

const EXCLUSION_KEYWORDS: &[&str] = &[
    "inteligência artificial",
    "machine learning",
    "deep learning",
    "rede neural",
    "explique",
    "analise",
    "compare",
    "descreva",
    "o que é",
    "como funciona",
    "por que",
    "qual",
];

const WEB_SEARCH_KEYWORDS: &[&str] = &[
    "pesquise",
    "procure",
    "busque",
    "encontre informações sobre",
    "notícias sobre",
    "dados atuais",
    "informações recentes",
    "últimas notícias",
    "dados estatísticos",
    "pesquisa sobre",
];

const CODE_EXECUTION_KEYWORDS: &[&str] = &[
    "execute",
    "rode",
    "compile",
    "debug",
    "teste este código",
    "execute este programa",
    "rode este script",
];

/// Decides whether a message should go to an external tool instead of a model.
///
/// Exclusion keywords are checked first and suppress tool use outright;
/// then web search, then code execution.
#[derive(Debug, Clone, Default)]
pub struct ToolDetector;

impl ToolDetector {
    pub fn new() -> Self {
        Self
    }

    pub fn needs_tool(&self, message: &str) -> Option<ToolRequest> {
        let text = message.to_lowercase();
        let matches = |words: &[&str]| words.iter().any(|w| text.contains(w));

        if matches(EXCLUSION_KEYWORDS) {
            return None;
        }

        if matches(WEB_SEARCH_KEYWORDS) {
            return Some(ToolRequest::new(
                ToolKind::WebSearch,
                message,
                "Explicit request to search for information",
            ));
        }

        if matches(CODE_EXECUTION_KEYWORDS) {
            return Some(ToolRequest::new(
                ToolKind::CodeExecution,
                message,
                "Explicit request to execute code",
            ));
        }

        None
    }
}
