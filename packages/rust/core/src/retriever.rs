//! Keyword context retrieval.
//!
//! A keyword matches when it occurs as a literal substring of the lowercased
//! query. Keys are compared as stored. There is no tokenization, so a short
//! keyword also matches inside longer words.

use crate::knowledge::KnowledgeBase;

/// Key whose text is returned when nothing matches.
pub const FALLBACK_KEY: &str = "instituto";

/// Returned when nothing matches and the fallback key is absent.
pub const NO_CONTEXT: &str = "No se encontró contexto específico.";

/// Retrieved context plus what produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Retrieval {
    /// Text to embed in the system prompt.
    pub context: String,
    /// Keywords that matched, in knowledge-file order.
    pub matched: Vec<String>,
    /// True when no keyword matched and fallback text was used.
    pub used_fallback: bool,
}

/// Context for `query` using the default fallback key.
pub fn retrieve(query: &str, kb: &KnowledgeBase) -> String {
    retrieve_detailed(query, kb, FALLBACK_KEY).context
}

/// Context for `query`, reporting matched keys. Matches are listed in
/// mapping order, not in the order they appear in the query.
pub fn retrieve_detailed(query: &str, kb: &KnowledgeBase, fallback_key: &str) -> Retrieval {
    let query = query.to_lowercase();

    let mut context = String::new();
    let mut matched = Vec::new();
    for (keyword, text) in kb.iter() {
        if query.contains(keyword) {
            context.push_str("- ");
            context.push_str(text);
            context.push('\n');
            matched.push(keyword.to_string());
        }
    }

    if context.is_empty() {
        let fallback = kb.get(fallback_key).unwrap_or(NO_CONTEXT);
        return Retrieval {
            context: fallback.to_string(),
            matched,
            used_fallback: true,
        };
    }

    Retrieval {
        context,
        matched,
        used_fallback: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> KnowledgeBase {
        KnowledgeBase::from_entries([
            ("horario", "Clases de 8 a 18hs."),
            ("instituto", "Instituto 13 de Julio, fundado en 1950."),
        ])
    }

    #[test]
    fn keyword_match() {
        assert_eq!(retrieve("¿Cuál es el horario?", &sample()), "- Clases de 8 a 18hs.\n");
    }

    #[test]
    fn no_match_uses_fallback_text_verbatim() {
        assert_eq!(
            retrieve("¿Dónde está?", &sample()),
            "Instituto 13 de Julio, fundado en 1950."
        );
    }

    #[test]
    fn no_match_without_fallback_key() {
        let kb = KnowledgeBase::from_entries([("horario", "Clases de 8 a 18hs.")]);
        assert_eq!(retrieve("hola", &kb), NO_CONTEXT);
        assert_eq!(retrieve("hola", &KnowledgeBase::default()), NO_CONTEXT);
    }

    #[test]
    fn query_is_lowercased() {
        assert_eq!(retrieve("HORARIO de cursada", &sample()), "- Clases de 8 a 18hs.\n");
    }

    #[test]
    fn keys_are_not_lowercased() {
        let kb = KnowledgeBase::from_entries([("Horario", "Clases de 8 a 18hs.")]);
        let r = retrieve_detailed("Horario", &kb, FALLBACK_KEY);
        assert!(r.used_fallback);
        assert_eq!(r.context, NO_CONTEXT);
    }

    #[test]
    fn multiple_matches_follow_mapping_order() {
        let kb = KnowledgeBase::from_entries([
            ("cuota", "La cuota mensual es de $1500."),
            ("horario", "Clases de 8 a 18hs."),
            ("instituto", "Instituto 13 de Julio."),
        ]);
        let r = retrieve_detailed("horario y cuota", &kb, FALLBACK_KEY);
        assert_eq!(
            r.context,
            "- La cuota mensual es de $1500.\n- Clases de 8 a 18hs.\n"
        );
        assert_eq!(r.matched, vec!["cuota", "horario"]);
        assert!(!r.used_fallback);
    }

    #[test]
    fn fallback_key_matched_as_keyword_is_prefixed() {
        let r = retrieve_detailed("háblame del instituto", &sample(), FALLBACK_KEY);
        assert_eq!(r.context, "- Instituto 13 de Julio, fundado en 1950.\n");
        assert!(!r.used_fallback);
    }

    #[test]
    fn substring_matches_inside_words() {
        let kb = KnowledgeBase::from_entries([("arte", "Taller de arte los viernes.")]);
        assert_eq!(retrieve("¿a qué hora parte el micro?", &kb), "- Taller de arte los viernes.\n");
    }

    #[test]
    fn custom_fallback_key() {
        let kb = KnowledgeBase::from_entries([("general", "Información general.")]);
        let r = retrieve_detailed("nada", &kb, "general");
        assert_eq!(r.context, "Información general.");
        assert!(r.used_fallback);
    }
}
