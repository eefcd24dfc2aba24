//! Prompt templates. The model answers in Spanish; JSON keys are fixed here
//! and mirrored by the drafts in `parse.rs`.

use crate::NoteKind;

pub(crate) fn improve_note(draft: &str, kind: NoteKind, context: Option<&str>) -> String {
  let context = context.map(str::trim).filter(|c| !c.is_empty()).unwrap_or("Ninguno");
  format!(
    r#"Actúa como un Supervisor Policial experto con años de experiencia en redacción de informes oficiales.
Tu tarea es transformar el siguiente borrador informal en una novedad policial técnica, formal y precisa.

Contexto adicional: {context}
Tipo de documento: {kind}

Borrador original:
"{draft}"

Reglas de redacción:
1. Usa lenguaje formal y técnico (ej. "se procedió", "apersonó", "suscitado").
2. Mantén la objetividad.
3. Sé conciso pero detallado en los hechos.
4. Corrige ortografía y gramática.
5. Si faltan datos clave (hora, lugar), déjalos indicados entre corchetes [HORA?].

Al final agrega una línea que comience con "RESUMEN:" seguida de un resumen de una línea para el parte diario.
"#
  )
}

pub(crate) fn extract_case(report: &str) -> String {
  format!(
    r#"Eres un asistente experto en análisis de reportes policiales.
Tu tarea es leer el siguiente reporte crudo (posiblemente copiado de WhatsApp) y extraer los datos clave para el sistema.

Reporte Original:
"""
{report}
"""

Instrucciones:
1. Identifica la naturaleza del hecho o tipo.
2. Identifica la hora del hecho.
3. Identifica el lugar exacto del hecho.
4. Identifica al encargado del caso o personal que atendió (grado y nombre).
5. Genera un detalle que sea un resumen técnico policial formal de lo sucedido.

Devuelve SOLO un objeto JSON válido con la estructura:
{{
  "kind": "String",
  "time": "String (HH:MM)",
  "place": "String",
  "responsible": "String (Grado y Nombre)",
  "detail": "String (Texto formal)"
}}
"#
  )
}

pub(crate) fn extract_operation(plan: &str) -> String {
  format!(
    r#"Eres un asistente especializado en extraer información estructurada de planes de operaciones policiales.

CONTEXTO:
Se te proporciona un mensaje de WhatsApp que contiene información sobre un servicio extraordinario policial.

CAMPOS A EXTRAER (si están disponibles):
1. operation_order - Número del plan (Ej: "1576/2025")
2. planned_personnel - Número total de personal contemplado (Ej: 22)
3. general_supervisor - Grado y nombre completo del supervisor general
4. operational_chief - Grado y nombre completo del jefe operativo
5. formation_place - Lugar donde forma el personal (Ej: "Patio Central")
6. formation_time - Hora de formación, formato HH:MM
7. installation_time - Hora de instalación, formato HH:MM
8. formed - Número de personal que formó
9. absent - Lista de grado y nombre del personal que faltó (Ej: "Sgto. Carlos Mamani")
10. on_leave - Lista de grado y nombre del personal con permiso
11. late - Lista de grado y nombre del personal atrasado
12. uniform_observations - Lista de {{ "person", "kind" }} con kind "Incorrecto", "Sucio/Desarreglado" o "Incompleto"
13. cases - Casos ocurridos DURANTE el servicio: {{ "kind", "time", "place", "responsible", "detail" }}. NO incluyas novedades de formación aquí.

INSTRUCCIONES:
- Extrae SOLO la información que encuentres explícitamente en el documento.
- Para campos numéricos usa números, no texto.
- Si un campo no está presente, NO lo incluyas en la respuesta.

Responde ÚNICAMENTE con un objeto JSON válido, sin texto adicional antes o después.

DOCUMENTO A ANALIZAR:
{plan}

RESPUESTA (solo JSON):"#
  )
}
