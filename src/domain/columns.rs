//! Column names of the input files and of the derived datasets.

pub const CONTROLE: &str = "Controle";
pub const PRO_COD: &str = "ProCod";
pub const PRO_NOM: &str = "ProNom";
pub const CLIENTE: &str = "Cliente";
pub const QUANTIDADE: &str = "Quantidade";
pub const TOTAL_ITEM: &str = "TotalItem";
pub const DATA: &str = "Data";
pub const BAIRRO: &str = "Bairro";

pub const ANO: &str = "Ano";
pub const SEMESTRE: &str = "Semestre";
pub const TRIMESTRE: &str = "Trimestre";
pub const MES_PERIODO: &str = "MesPeriodo";
pub const SEMANA_INICIO: &str = "SemanaInicioDt";
pub const DIA: &str = "Dia";
pub const DIA_SEMANA: &str = "DiaSemana";

pub const TOTAL_VENDA: &str = "TotalVenda";
pub const QUANTIDADE_ITENS: &str = "QuantidadeItens";

pub const PRODUTO: &str = "Produto";
pub const PERIODO: &str = "Periodo";

/// Columns every sales file must carry.
pub const SALES_REQUIRED: [&str; 7] = [
    CONTROLE, PRO_COD, CLIENTE, QUANTIDADE, TOTAL_ITEM, DATA, BAIRRO,
];

/// Columns every catalog file must carry.
pub const CATALOG_REQUIRED: [&str; 2] = [PRO_COD, PRO_NOM];
