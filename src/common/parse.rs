// Coerções tolerantes para payloads que chegam tanto de JSON "de verdade"
// quanto de formulários HTML serializados: o frontend manda `precio` como
// número ou string, ids como string vazia, booleans como "on"/"1"...
// Os deserializers abaixo reproduzem essas regras de aceitação.

use serde::{Deserialize, Deserializer};

#[derive(Deserialize)]
#[serde(untagged)]
enum NumeroOuTexto {
    Numero(f64),
    Texto(String),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum InteiroOuTexto {
    Inteiro(i64),
    Texto(String),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum BoolFlexivel {
    Bool(bool),
    Inteiro(i64),
    Texto(String),
}

/// `6.5`, `"6.5"` ou `"6,50"` viram `Some(6.5)`; ausente/null vira `None`.
pub fn opt_f64_flexible<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let valor = Option::<NumeroOuTexto>::deserialize(deserializer)?;
    match valor {
        None => Ok(None),
        Some(NumeroOuTexto::Numero(n)) => Ok(Some(n)),
        Some(NumeroOuTexto::Texto(s)) => {
            let s = s.trim().replace(',', ".");
            if s.is_empty() {
                return Ok(None);
            }
            s.parse::<f64>().map(Some).map_err(|_| {
                serde::de::Error::custom("debe ser un número válido")
            })
        }
    }
}

/// Ids opcionais: aceita inteiro, string numérica, `""` e `null` (ambos `None`).
/// Strings não numéricas também viram `None`, como o backend antigo fazia.
pub fn opt_i64_flexible<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let valor = Option::<InteiroOuTexto>::deserialize(deserializer)?;
    match valor {
        None => Ok(None),
        Some(InteiroOuTexto::Inteiro(n)) => Ok(Some(n)),
        Some(InteiroOuTexto::Texto(s)) => Ok(s.trim().parse::<i64>().ok()),
    }
}

/// Booleans de checkbox: `true`, `"true"`, `"on"`, `"1"`, `1`...
/// Qualquer valor irreconhecível cai no `true` (comportamento herdado).
pub fn opt_bool_flexible<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    let valor = Option::<BoolFlexivel>::deserialize(deserializer)?;
    Ok(valor.map(|v| match v {
        BoolFlexivel::Bool(b) => b,
        BoolFlexivel::Inteiro(n) => n != 0,
        BoolFlexivel::Texto(s) => match s.trim().to_lowercase().as_str() {
            "1" | "true" | "t" | "yes" | "y" | "on" => true,
            "0" | "false" | "f" | "no" | "n" | "off" => false,
            outro => outro.parse::<i64>().map(|n| n != 0).unwrap_or(true),
        },
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Deserialize)]
    struct Payload {
        #[serde(default, deserialize_with = "opt_f64_flexible")]
        precio: Option<f64>,
        #[serde(default, deserialize_with = "opt_i64_flexible")]
        categoria_id: Option<i64>,
        #[serde(default, deserialize_with = "opt_bool_flexible")]
        disponible: Option<bool>,
    }

    #[test]
    fn precio_aceita_numero_e_string() {
        let p: Payload = serde_json::from_str(r#"{"precio": "6.00"}"#).unwrap();
        assert_eq!(p.precio, Some(6.0));
        let p: Payload = serde_json::from_str(r#"{"precio": 12.5}"#).unwrap();
        assert_eq!(p.precio, Some(12.5));
        let p: Payload = serde_json::from_str(r#"{"precio": "3,50"}"#).unwrap();
        assert_eq!(p.precio, Some(3.5));
    }

    #[test]
    fn precio_invalido_rejeita() {
        assert!(serde_json::from_str::<Payload>(r#"{"precio": "caro"}"#).is_err());
    }

    #[test]
    fn id_vazio_vira_none() {
        let p: Payload = serde_json::from_str(r#"{"categoria_id": ""}"#).unwrap();
        assert_eq!(p.categoria_id, None);
        let p: Payload = serde_json::from_str(r#"{"categoria_id": "7"}"#).unwrap();
        assert_eq!(p.categoria_id, Some(7));
    }

    #[test]
    fn bool_de_formulario() {
        let p: Payload = serde_json::from_str(r#"{"disponible": "on"}"#).unwrap();
        assert_eq!(p.disponible, Some(true));
        let p: Payload = serde_json::from_str(r#"{"disponible": "0"}"#).unwrap();
        assert_eq!(p.disponible, Some(false));
        let p: Payload = serde_json::from_str(r#"{}"#).unwrap();
        assert_eq!(p.disponible, None);
    }
}
