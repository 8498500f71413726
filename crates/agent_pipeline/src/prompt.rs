//! Prompt construction for the three generation flavors.
//!
//! The templates are fixed Spanish instruction blocks; only the exercise
//! statement, the answer options, and the chat transcript vary. Building a
//! prompt is pure string work, so the same request always produces the same
//! prompt.

use logic_core::chat::ChatMessage;
use logic_core::GenerationRequest;

/// Instruction block for logic and code exercises. The model must answer
/// with a flat JSON object matching the four-field contract.
const LOGIC_INSTRUCTIONS: &str = r#"Eres un agente lógico especializado en resolver ejercicios de lógica matemática, razonamiento abstracto y problemas tipo test. Tu tarea es analizar el enunciado, identificar la lógica subyacente y ofrecer una solución clara y estructurada.

Devuelve la respuesta exclusivamente en formato JSON plano. No uses bloques Markdown como ```json ni ningún otro tipo de formato. No incluyas texto introductorio ni explicaciones fuera del JSON.

Formato esperado:
{
  "respuesta": "...",
  "explicacion": "...",
  "tipo": "...",
  "nivel": "fácil | medio | difícil"
}"#;

/// Instruction block for diagram generation. The rules mirror exactly what
/// sanitization repairs, so a model that ignores one of them still yields a
/// renderable graph.
const DIAGRAM_INSTRUCTIONS: &str = r#"Genera un diagrama de flujo en formato Mermaid para el siguiente algoritmo.

REGLAS ESTRICTAS:
1. Usa SOLO la sintaxis: graph TD
2. Los nodos deben ser simples: A[texto corto], B{pregunta?}, C((inicio))
3. NO uses paréntesis ni corchetes dobles dentro de los nodos
4. NO uses comillas dentro de los nodos
5. Mantén los textos de nodos MUY cortos (máximo 30 caracteres)
6. Las conexiones: A-->B o A-->|Si|B
7. Cada nodo SOLO un corchete de apertura y uno de cierre: A[texto]
8. NO añadas explicaciones

EJEMPLO CORRECTO:
graph TD
    A((Inicio))
    B[Leer N]
    C{Es par?}
    D[Mostrar par]
    E[Mostrar impar]
    F((Fin))
    A-->B
    B-->C
    C-->|Si|D
    C-->|No|E
    D-->F
    E-->F"#;

/// Build the prompt for an explain or code request.
pub fn logic_prompt(request: &GenerationRequest) -> String {
    let mut prompt = format!(
        "{LOGIC_INSTRUCTIONS}\n\nEjercicio:\n{}\n",
        request.problem_statement
    );
    if let Some(options) = &request.options {
        prompt.push_str("Opciones: ");
        prompt.push_str(&options.join(", "));
    }
    prompt
}

/// Build the prompt for a diagram request.
pub fn diagram_prompt(request: &GenerationRequest) -> String {
    format!(
        "{DIAGRAM_INSTRUCTIONS}\n\nAlgoritmo:\n{}\n\nSOLO código Mermaid, sin texto adicional.",
        request.problem_statement
    )
}

/// Build the tutor prompt for a chat turn from the windowed transcript.
///
/// `messages` is the already-windowed recent slice of the session; roles are
/// rendered inline so the model sees who said what.
pub fn chat_prompt(context: Option<&str>, messages: &[ChatMessage]) -> String {
    let transcript = messages
        .iter()
        .map(|message| format!("{}: {}", message.role.as_str(), message.content))
        .collect::<Vec<_>>()
        .join("\n");

    let context_line = match context {
        Some(context) if !context.is_empty() => format!("Contexto del ejercicio: {context}"),
        _ => String::new(),
    };

    format!(
        "Eres un tutor de programación especializado en explicar lógica y algoritmos.\n\
         Ayudas a estudiantes a entender ejercicios de programación paso a paso.\n\
         \n\
         {context_line}\n\
         \n\
         Conversación previa:\n\
         {transcript}\n\
         \n\
         Responde de manera clara, didáctica y amigable. Si explicas código, usa ejemplos prácticos."
    )
}
