// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// PAPER OPTIMIZER CLI
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//
// CLI para otimizar o texto de um artigo (PDF, texto ou markdown).
//
// Uso:
//   paper-optimizer-cli artigo.pdf
//   paper-optimizer-cli --strategy sections --budget 3000 artigo.pdf
//   paper-optimizer-cli --analyze https://arxiv.org/pdf/1706.03762
//   paper-optimizer-cli --json notas.md > resultado.json
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

use anyhow::{anyhow, bail, Context};
use paper_optimizer::config::{load_llm_config, load_optimizer_config};
use paper_optimizer::optimizer::{parse_sections, OpenAiSummarizer};
use paper_optimizer::prelude::*;
use paper_optimizer::sections::analyze_structure;
use paper_optimizer::utils::{preview, FileReader};
use std::path::PathBuf;
use std::sync::Arc;

/// Argumentos da linha de comando
#[derive(Debug)]
struct CliArgs {
    source: String,
    strategy: Option<Strategy>,
    budget: Option<usize>,
    sections: Option<Vec<CanonicalSection>>,
    json: bool,
    analyze: bool,
}

fn print_usage(program: &str) {
    eprintln!("Paper Optimizer CLI v{}", paper_optimizer::VERSION);
    eprintln!();
    eprintln!("Uso: {} [opções] <arquivo|url>", program);
    eprintln!();
    eprintln!("Opções:");
    eprintln!("  --strategy <s>     none, truncate, sections, smart, chunk, auto (padrão: smart)");
    eprintln!("  --budget <tokens>  Orçamento de tokens (padrão: 4000)");
    eprintln!("  --sections <a,b>   Seções incluídas (ex: abstract,results)");
    eprintln!("  --analyze          Só analisa: tokens, custo, seções e estratégia recomendada");
    eprintln!("  --json             Saída em JSON");
    eprintln!();
    eprintln!("Exemplos:");
    eprintln!("  {} artigo.pdf", program);
    eprintln!("  {} --strategy auto --budget 3000 https://arxiv.org/pdf/1706.03762", program);
}

fn parse_args(args: &[String]) -> anyhow::Result<CliArgs> {
    let mut source = None;
    let mut strategy = None;
    let mut budget = None;
    let mut sections = None;
    let mut json = false;
    let mut analyze = false;

    let mut iter = args.iter().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--strategy" => {
                let value = iter.next().ok_or_else(|| anyhow!("--strategy requer um valor"))?;
                strategy = Some(value.parse::<Strategy>()?);
            }
            "--budget" => {
                let value = iter.next().ok_or_else(|| anyhow!("--budget requer um valor"))?;
                let parsed: usize = value
                    .parse()
                    .with_context(|| format!("--budget inválido: {}", value))?;
                budget = Some(parsed);
            }
            "--sections" => {
                let value = iter.next().ok_or_else(|| anyhow!("--sections requer um valor"))?;
                sections = Some(parse_sections(value)?);
            }
            "--json" => json = true,
            "--analyze" => analyze = true,
            other if other.starts_with("--") => bail!("opção desconhecida: {}", other),
            other => {
                if source.replace(other.to_string()).is_some() {
                    bail!("apenas um arquivo ou URL por execução");
                }
            }
        }
    }

    Ok(CliArgs {
        source: source.ok_or_else(|| anyhow!("informe um arquivo ou URL"))?,
        strategy,
        budget,
        sections,
        json,
        analyze,
    })
}

/// Tenta carregar o arquivo .env do diretório atual ou do diretório do crate
fn load_dotenv() {
    let possible_paths = [PathBuf::from(".env"), PathBuf::from(env!("CARGO_MANIFEST_DIR")).join(".env")];

    for path in &possible_paths {
        if path.exists() {
            match dotenvy::from_path(path) {
                Ok(_) => {
                    eprintln!("✓ Carregado .env de: {:?}", path);
                    return;
                }
                Err(e) => eprintln!("⚠ Erro ao carregar {:?}: {}", path, e),
            }
        }
    }
}

fn main() -> anyhow::Result<()> {
    // .env antes de tudo: a configuração vem do ambiente
    load_dotenv();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = std::env::args().collect();
    let program = args.first().map(String::as_str).unwrap_or("paper-optimizer-cli");
    if args.len() < 2 {
        print_usage(program);
        std::process::exit(1);
    }

    let cli = match parse_args(&args) {
        Ok(cli) => cli,
        Err(e) => {
            eprintln!("✗ {}", e);
            eprintln!();
            print_usage(program);
            std::process::exit(2);
        }
    };

    let config = load_optimizer_config();
    config.validate().context("configuração do otimizador inválida")?;
    let llm_config = load_llm_config();

    let content = FileReader::new()
        .read(&cli.source)
        .with_context(|| format!("falha ao ler {}", cli.source))?;
    log::info!(
        "📄 {} ({:?}, {} palavras)",
        content.source,
        content.file_type,
        content.word_count
    );
    let document = content.into_document();

    let mut optimizer = Optimizer::from_config(&config);
    if llm_config.api_key.is_some() {
        let summarizer = OpenAiSummarizer::new(llm_config).context("falha ao criar cliente de model-assist")?;
        optimizer = optimizer.with_summarizer(Arc::new(summarizer));
    }

    if cli.analyze {
        return run_analyze(&optimizer, &document, cli.json);
    }

    let mut options = config.options();
    if let Some(strategy) = cli.strategy {
        options.strategy = strategy;
    }
    if let Some(budget) = cli.budget {
        options.token_budget = budget;
    }
    if let Some(sections) = cli.sections {
        options.include_sections = sections;
    }

    let outcome = optimizer.optimize(&document, &options)?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
        return Ok(());
    }

    match &outcome {
        OptimizationOutcome::Text(optimized) => {
            println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
            println!("{}", optimized.optimization_info);
            println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
            println!();
            println!("{}", optimized.text);
        }
        OptimizationOutcome::Chunked(chunked) => {
            println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
            println!(
                "✂️  {} chunks ({} tokens no original, {})",
                chunked.chunk_count,
                chunked.original_tokens,
                chunked.original_cost.format()
            );
            println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
            for (i, (chunk, tokens)) in chunked.chunks.iter().zip(&chunked.chunk_tokens).enumerate() {
                println!();
                println!("── Chunk {} ({} tokens) ──", i + 1, tokens);
                println!("{}", preview(chunk, 300));
            }
        }
    }

    Ok(())
}

/// Relatório de análise sem otimizar
fn run_analyze(optimizer: &Optimizer, document: &Document, json: bool) -> anyhow::Result<()> {
    let cost = optimizer.estimate_cost(&document.text)?;
    let recommended = optimizer.thresholds().recommend(cost.input_tokens);
    let sections = optimizer.extract_sections(document);
    let structure = analyze_structure(&document.text);

    if json {
        let report = serde_json::json!({
            "source_kind": document.kind,
            "tokens": cost.input_tokens,
            "cost": cost,
            "recommended_strategy": recommended,
            "sections": sections,
            "structure": structure,
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!(" ANÁLISE");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("Origem:      {:?}", document.kind);
    println!("Tokens:      {}", cost.input_tokens);
    println!("Custo:       {}", cost.format());
    println!("Recomendada: {}", recommended);
    println!();

    if sections.is_empty() {
        println!("📭 Nenhuma seção canônica encontrada");
    } else {
        println!("🔎 Seções encontradas:");
        for section in sections.iter() {
            println!(
                "   {:<14} {} ({} caracteres)",
                section.canonical.as_str(),
                section.raw_header,
                section.body.chars().count()
            );
        }
    }

    println!();
    println!(
        "📐 Estrutura: {} linhas, {} candidatos a cabeçalho, {} numerados, {} em caixa alta",
        structure.total_lines,
        structure.potential_headers.len(),
        structure.numbered_sections.len(),
        structure.all_caps_lines.len()
    );
    if structure.has_no_headers() {
        println!("⚠️  Nenhum cabeçalho detectado: sections/smart vão cair em truncate");
    }

    Ok(())
}
