// src/services/iconos.rs
//
// Detecção automática de ícone e geração de código para categorias e
// subcategorias. O admin pode sempre mandar `icono`/`codigo` explícitos;
// isto aqui só preenche o que ele deixou em branco.

/// Tabela de palavras-chave → emoji para categorias do menu.
const ICONOS_CATEGORIA: &[(&str, &str)] = &[
    // Entradas e aperitivos
    ("entrada", "🍜"),
    ("aperitivo", "🍜"),
    ("tapa", "🍜"),
    ("picada", "🍜"),
    // Pratos principais
    ("plato", "🍽️"),
    ("principal", "🍽️"),
    ("almuerzo", "🍽️"),
    ("cena", "🍽️"),
    ("comida", "🍽️"),
    ("menu", "🍽️"),
    ("ejecutivo", "🍽️"),
    ("combo", "🍽️"),
    // Postres
    ("postre", "🧁"),
    ("dulce", "🧁"),
    ("torta", "🍰"),
    ("pastel", "🍰"),
    ("helado", "🍦"),
    ("reposteria", "🧁"),
    // Bebidas
    ("cerveza", "🍺"),
    ("vino", "🍷"),
    ("bebida", "🍷"),
    ("coctel", "🍸"),
    ("jugo", "🧃"),
    ("refresco", "🥤"),
    ("gaseosa", "🥤"),
    ("soda", "🥤"),
    ("cafe", "☕"),
    ("te", "🍵"),
    ("aromatica", "🍵"),
    ("infusion", "🍵"),
    // Comidas específicas
    ("pizza", "🍕"),
    ("hamburguesa", "🍔"),
    ("sandwich", "🥪"),
    ("taco", "🌮"),
    ("mexicana", "🌮"),
    ("sushi", "🍣"),
    ("asiatica", "🍜"),
    // Saudáveis
    ("ensalada", "🥗"),
    ("saludable", "🥗"),
    ("vegetariana", "🥗"),
    ("vegana", "🌱"),
    // Panadería / desayuno
    ("panaderia", "🥖"),
    ("pan", "🍞"),
    ("desayuno", "🥐"),
    // Snacks
    ("snack", "🍿"),
    ("papa", "🍟"),
    ("nacho", "🧀"),
    // Carnes
    ("carne", "🥩"),
    ("parrilla", "🥩"),
    ("pollo", "🍗"),
    ("pescado", "🐟"),
    ("marisco", "🦐"),
    // Especiais
    ("promocion", "🎉"),
    ("promo", "🎉"),
    ("especial", "⭐"),
];

/// Subcategorias têm um mapeamento mais granular que o das categorias.
const ICONOS_SUBCATEGORIA: &[(&str, &str)] = &[
    ("carne", "🥩"),
    ("res", "🥩"),
    ("cerdo", "🥓"),
    ("pollo", "🍗"),
    ("pescado", "🐟"),
    ("marisco", "🦐"),
    ("cerveza", "🍺"),
    ("artesanal", "🍺"),
    ("vino", "🍷"),
    ("tinto", "🍷"),
    ("blanco", "🍷"),
    ("whisky", "🥃"),
    ("ron", "🥃"),
    ("cafe", "☕"),
    ("espresso", "☕"),
    ("cappuccino", "☕"),
    ("te", "🍵"),
    ("infusion", "🍵"),
    ("jugo", "🧃"),
    ("gaseosa", "🥤"),
    ("helado", "🍨"),
    ("torta", "🍰"),
    ("flan", "🍮"),
    ("chocolate", "🍫"),
    ("fruta", "🍓"),
    ("pasta", "🍝"),
    ("arroz", "🍚"),
    ("pizza", "🍕"),
    ("ensalada", "🥗"),
    ("vegano", "🥬"),
    ("vegetariano", "🥬"),
    ("pan", "🍞"),
    ("empanada", "🥟"),
    ("picante", "🌶️"),
    ("frio", "❄️"),
    ("caliente", "🔥"),
    ("premium", "⭐"),
    ("gourmet", "👨‍🍳"),
    ("casero", "🏠"),
    ("infantil", "🧒"),
];

pub const ICONO_CATEGORIA_DEFAULT: &str = "🍽️";
pub const ICONO_SUBCATEGORIA_DEFAULT: &str = "🏷️";

/// Tira os acentos do espanhol/português; o resto passa direto.
pub fn quitar_acentos(texto: &str) -> String {
    texto
        .chars()
        .map(|c| match c {
            'á' | 'à' | 'â' | 'ã' | 'ä' => 'a',
            'é' | 'è' | 'ê' | 'ë' => 'e',
            'í' | 'ì' | 'î' | 'ï' => 'i',
            'ó' | 'ò' | 'ô' | 'õ' | 'ö' => 'o',
            'ú' | 'ù' | 'û' | 'ü' => 'u',
            'ñ' => 'n',
            'ç' => 'c',
            'Á' | 'À' | 'Â' | 'Ã' | 'Ä' => 'A',
            'É' | 'È' | 'Ê' | 'Ë' => 'E',
            'Í' | 'Ì' | 'Î' | 'Ï' => 'I',
            'Ó' | 'Ò' | 'Ô' | 'Õ' | 'Ö' => 'O',
            'Ú' | 'Ù' | 'Û' | 'Ü' => 'U',
            'Ñ' => 'N',
            'Ç' => 'C',
            _ => c,
        })
        .collect()
}

fn preparar(nombre: &str) -> String {
    quitar_acentos(nombre.trim()).to_lowercase()
}

/// Escolhe o emoji de uma categoria pelo nome: match exato, depois
/// substring nos dois sentidos, depois palavra a palavra.
pub fn detectar_icono_categoria(nombre: &str) -> &'static str {
    let nombre = preparar(nombre);

    for (clave, icono) in ICONOS_CATEGORIA {
        if nombre == *clave {
            return icono;
        }
    }
    for (clave, icono) in ICONOS_CATEGORIA {
        if nombre.contains(clave) || clave.contains(nombre.as_str()) {
            return icono;
        }
    }
    for palabra in nombre.split_whitespace() {
        for (clave, icono) in ICONOS_CATEGORIA {
            if palabra == *clave {
                return icono;
            }
        }
    }
    ICONO_CATEGORIA_DEFAULT
}

pub fn detectar_icono_subcategoria(nombre: &str) -> &'static str {
    let nombre = preparar(nombre);
    for (clave, icono) in ICONOS_SUBCATEGORIA {
        if nombre.contains(clave) {
            return icono;
        }
    }
    ICONO_SUBCATEGORIA_DEFAULT
}

/// Código sugerido a partir do nome: nome composto usa as duas primeiras
/// letras das duas primeiras palavras; nome simples usa as quatro primeiras.
/// Colisões são resolvidas pelo serviço com um sufixo numérico.
pub fn generar_codigo(nombre: &str) -> String {
    let limpio = quitar_acentos(nombre.trim());
    let palabras: Vec<String> = limpio
        .split_whitespace()
        .map(|p| p.chars().filter(|c| c.is_ascii_alphanumeric()).collect::<String>())
        .filter(|p| !p.is_empty())
        .collect();

    let codigo = match palabras.as_slice() {
        [] => String::from("CAT"),
        [una] => una.chars().take(4).collect(),
        [primera, segunda, ..] => {
            let mut c: String = primera.chars().take(2).collect();
            c.extend(segunda.chars().take(2));
            c
        }
    };
    codigo.to_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn icono_por_nombre_exacto() {
        assert_eq!(detectar_icono_categoria("Bebidas"), "🍷");
        assert_eq!(detectar_icono_categoria("  postres "), "🧁");
    }

    #[test]
    fn icono_ignora_acentos() {
        assert_eq!(detectar_icono_categoria("Café"), "☕");
        assert_eq!(detectar_icono_categoria("Menú del día"), "🍽️");
    }

    #[test]
    fn icono_por_palabra_contenida() {
        assert_eq!(detectar_icono_categoria("Cervezas importadas"), "🍺");
        assert_eq!(detectar_icono_subcategoria("Vinos tintos"), "🍷");
    }

    #[test]
    fn icono_desconocido_usa_default() {
        assert_eq!(detectar_icono_categoria("Zzyzx"), ICONO_CATEGORIA_DEFAULT);
        assert_eq!(detectar_icono_subcategoria("Zzyzx"), ICONO_SUBCATEGORIA_DEFAULT);
    }

    #[test]
    fn codigo_nombre_simple() {
        assert_eq!(generar_codigo("Bebidas"), "BEBI");
        assert_eq!(generar_codigo("Té"), "TE");
    }

    #[test]
    fn codigo_nombre_compuesto() {
        assert_eq!(generar_codigo("Platos Principales"), "PLPR");
        assert_eq!(generar_codigo("menú del día"), "MEDE");
    }
}
