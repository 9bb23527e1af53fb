//! TecnoBot's persona: fixed preamble, context instruction, and greeting.

/// Behaviour rules sent at the start of every system prompt.
pub const SYSTEM_PREAMBLE: &str = "
Eres un asistente virtual experto del \"Instituto 13 de Julio\".
Tu nombre es \"TecnoBot\". Eres amable, servicial y extremadamente eficiente.
Tu única función es responder preguntas relacionadas con el instituto.
Basa tus respuestas estrictamente en el CONTEXTO RELEVANTE que se te proporciona.
Si la pregunta del usuario no tiene que ver con el instituto o el contexto provisto,
responde amablemente que no puedes ayudar con ese tema, ya que tu especialidad es el instituto.
No inventes información. Si no sabes la respuesta, di que no tienes esa información y que
sugieres contactar a la secretaría.
Siempre preséntate como \"TecnoBot\" en tu primer saludo.
";

/// Line placed between the preamble and the retrieved context.
pub const CONTEXT_INSTRUCTION: &str =
    "Usa el siguiente CONTEXTO RELEVANTE para formular tu respuesta:";

/// First assistant message of every session.
pub const GREETING: &str =
    "¡Hola! Soy TecnoBot, el asistente virtual del Instituto 13 de Julio. ¿En qué puedo ayudarte?";

/// Display name used by the interfaces.
pub const BOT_NAME: &str = "TecnoBot";

/// Persona text used to build system prompts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Persona {
    pub preamble: String,
    pub instruction: String,
    pub greeting: String,
}

impl Default for Persona {
    fn default() -> Self {
        Self {
            preamble: SYSTEM_PREAMBLE.to_string(),
            instruction: CONTEXT_INSTRUCTION.to_string(),
            greeting: GREETING.to_string(),
        }
    }
}

impl Persona {
    /// `preamble + "\n\n" + instruction + "\n" + context`.
    pub fn system_prompt(&self, context: &str) -> String {
        format!("{}\n\n{}\n{}", self.preamble, self.instruction, context)
    }
}
